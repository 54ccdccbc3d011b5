use super::{Activation, Field, ParticleBuffers};
use crate::color::hsl;
use crate::constants::*;
use crate::keys::{FieldId, Trigger};
use crate::state::FrameInput;
use glam::Vec3;
use rand::prelude::*;

/// 2π · (1 − 1/φ)
pub const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Sunflower spiral that slowly inhales and exhales, with a bright ring
/// sweeping outward through it.
pub struct Breather {
    trigger: Trigger,
    activation: Activation,
    buffers: ParticleBuffers,
    angles: Vec<f32>,
    radii: Vec<f32>,
}

impl Breather {
    pub fn new(trigger: Trigger, seed: u64) -> Self {
        Self::with_count(trigger, BREATHER_COUNT, seed)
    }

    pub fn with_count(trigger: Trigger, count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut angles = Vec::with_capacity(count);
        let mut radii = Vec::with_capacity(count);
        let mut positions = Vec::with_capacity(count);
        for i in 0..count {
            let t = (i + 1) as f32;
            let a = t * GOLDEN_ANGLE;
            let r = BREATHER_MAX_RADIUS * (t / count as f32).sqrt();
            angles.push(a);
            radii.push(r);
            positions.push(Vec3::new(
                a.cos() * r,
                a.sin() * r,
                (rng.gen::<f32>() - 0.5) * 0.4,
            ));
        }
        let colors = vec![hsl(0.58, 0.45, 0.72); count];
        Self {
            trigger,
            activation: Activation::new(0.0, DEFAULT_FADE_RATE, BREATHER_PEAK_OPACITY),
            buffers: ParticleBuffers::from_parts(positions, colors),
            angles,
            radii,
        }
    }

    pub fn buffers(&self) -> &ParticleBuffers {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut ParticleBuffers {
        &mut self.buffers
    }
}

impl Field for Breather {
    fn id(&self) -> FieldId {
        FieldId::Breather
    }

    fn step(&mut self, input: &FrameInput) {
        self.activation
            .step(self.trigger.is_live(input.key), input.delta);
        if self.activation.dormant() {
            return;
        }

        let t = input.elapsed;
        let breath = 1.0 + 0.14 * (t * 0.9).sin();
        let swirl = 0.06 * (t * 0.25).sin();
        let ring = 6.0 + 5.5 * (0.5 + 0.5 * (t * 0.18).sin());

        for i in 0..self.buffers.len() {
            let fi = i as f32;
            let a = self.angles[i] + swirl;
            let r = self.radii[i] * breath;
            let jitter = 0.06 * (t * 0.8 + fi * 0.025).sin();
            self.buffers.positions[i] = Vec3::new(
                a.cos() * (r + jitter),
                a.sin() * (r + jitter),
                0.25 * (t * 0.3 + fi * 0.05).sin(),
            );

            let hue = 0.56 + 0.08 * (t * 0.12 + r * 0.05).sin();
            let light = 0.65 + 0.15 * (t * 0.18 + fi * 0.01).sin();
            let d = (r - ring).abs();
            let highlight = if d < 0.4 {
                0.2
            } else if d < 0.8 {
                0.1
            } else {
                0.0
            };
            self.buffers.colors[i] = hsl(hue, 0.5, (light + highlight).min(0.9));
        }
        self.buffers.mark_dirty();
    }

    fn activation(&self) -> &Activation {
        &self.activation
    }
}
