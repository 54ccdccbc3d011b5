use super::{Activation, Field, ParticleBuffers};
use crate::color::hsl;
use crate::constants::*;
use crate::keys::{FieldId, ProjectKey, Trigger};
use crate::state::FrameInput;
use glam::Vec3;
use rand::prelude::*;

/// One precomputed arrangement the starfield can morph into.
#[derive(Clone, Debug)]
pub struct Layout {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
}

impl Layout {
    /// Random cube of softly tinted stars.
    pub fn stars(count: usize, rng: &mut StdRng) -> Self {
        let mut positions = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);
        for _ in 0..count {
            positions.push(Vec3::new(
                (rng.gen::<f32>() - 0.5) * STARFIELD_CUBE_SIDE,
                (rng.gen::<f32>() - 0.5) * STARFIELD_CUBE_SIDE,
                (rng.gen::<f32>() - 0.5) * STARFIELD_CUBE_SIDE,
            ));
            colors.push(hsl(rng.gen::<f32>(), 0.7, 0.85));
        }
        Self { positions, colors }
    }

    /// Red slab with a white play triangle in front of it.
    pub fn play_button(count: usize, rng: &mut StdRng) -> Self {
        let s = LOGO_SCALE;
        let v1 = Vec3::new(2.5 * s, 0.0, 0.0);
        let v2 = Vec3::new(-1.5 * s, 2.0 * s, 0.0);
        let v3 = Vec3::new(-1.5 * s, -2.0 * s, 0.0);
        let slab = (count as f32 * LOGO_SLAB_SHARE) as usize;

        let mut positions = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);
        for i in 0..count {
            let z = (rng.gen::<f32>() - 0.5) * 2.0 * s;
            if i < slab {
                positions.push(Vec3::new(
                    (rng.gen::<f32>() - 0.5) * 16.0 * s,
                    (rng.gen::<f32>() - 0.5) * 10.0 * s,
                    z,
                ));
                colors.push(Vec3::from(LOGO_RED));
            } else {
                // Uniform barycentric sample inside the triangle.
                let r1: f32 = rng.gen();
                let r2: f32 = rng.gen();
                let s1 = 1.0 - r1.sqrt();
                let s2 = r1.sqrt() * (1.0 - r2);
                let s3 = r1.sqrt() * r2;
                let p = v1 * s1 + v2 * s2 + v3 * s3;
                positions.push(Vec3::new(p.x, p.y, z));
                colors.push(Vec3::from(LOGO_WHITE));
            }
        }
        Self { positions, colors }
    }
}

/// The base particle layer: a drifting starfield that reshapes itself into a
/// logo for the video project and hides behind the scene-specific fields.
pub struct Starfield {
    trigger: Trigger,
    activation: Activation,
    buffers: ParticleBuffers,
    stars: Layout,
    logo: Layout,
    phases: Vec<f32>,
}

impl Starfield {
    pub fn new(trigger: Trigger, seed: u64) -> Self {
        Self::with_count(trigger, STARFIELD_COUNT, seed)
    }

    pub fn with_count(trigger: Trigger, count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let stars = Layout::stars(count, &mut rng);
        let logo = Layout::play_button(count, &mut rng);
        let phases = (0..count)
            .map(|_| rng.gen::<f32>() * std::f32::consts::TAU)
            .collect();
        Self {
            trigger,
            // The page opens with no project hovered, so the stars start lit.
            activation: Activation::new(1.0, DEFAULT_FADE_RATE, STARFIELD_PEAK_OPACITY),
            // Spawn collapsed at the origin; the first frames expand into the layout.
            buffers: ParticleBuffers::new(count, Vec3::ZERO, Vec3::ONE),
            stars,
            logo,
            phases,
        }
    }

    pub fn buffers(&self) -> &ParticleBuffers {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut ParticleBuffers {
        &mut self.buffers
    }
}

impl Field for Starfield {
    fn id(&self) -> FieldId {
        FieldId::Starfield
    }

    fn step(&mut self, input: &FrameInput) {
        self.activation
            .step(self.trigger.is_live(input.key), input.delta);
        if self.activation.dormant() {
            return;
        }

        let logo_active = input.key == Some(ProjectKey::YoutubeDm);
        let layout = if logo_active { &self.logo } else { &self.stars };
        let morph = (input.delta * STARFIELD_MORPH_RATE).min(1.0);
        let t = input.elapsed;

        for i in 0..self.buffers.len() {
            let mut target = layout.positions[i];
            if logo_active {
                target.z +=
                    (t * 1.5 + target.x * 0.1 + self.phases[i]).sin() * LOGO_WOBBLE_AMPLITUDE;
            }
            let p = &mut self.buffers.positions[i];
            *p += (target - *p) * morph;
            let c = &mut self.buffers.colors[i];
            *c += (layout.colors[i] - *c) * morph;
        }
        self.buffers.mark_dirty();
    }

    fn activation(&self) -> &Activation {
        &self.activation
    }
}
