use super::{Activation, Field, ParticleBuffers};
use crate::color::hsl;
use crate::constants::*;
use crate::keys::{FieldId, Trigger};
use crate::state::FrameInput;
use glam::Vec3;
use rand::prelude::*;
use std::f32::consts::TAU;

/// Flat grid of points rippled by three interfering sine waves, shaded from
/// ember to amber by local amplitude.
pub struct Wavefield {
    trigger: Trigger,
    activation: Activation,
    buffers: ParticleBuffers,
    columns: usize,
    column_phases: Vec<f32>,
    row_phases: Vec<f32>,
}

impl Wavefield {
    pub fn new(trigger: Trigger, seed: u64) -> Self {
        Self::with_grid(trigger, WAVEFIELD_COLUMNS, WAVEFIELD_ROWS, seed)
    }

    pub fn with_grid(trigger: Trigger, columns: usize, rows: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let column_phases = (0..columns).map(|_| rng.gen::<f32>() * TAU).collect();
        let row_phases = (0..rows).map(|_| rng.gen::<f32>() * TAU).collect();

        let dx = WAVEFIELD_SPACING;
        let ox = -(columns.saturating_sub(1) as f32 * dx) / 2.0;
        let oz = -(rows.saturating_sub(1) as f32 * dx) / 2.0;
        let mut positions = Vec::with_capacity(columns * rows);
        for iz in 0..rows {
            for ix in 0..columns {
                positions.push(Vec3::new(ox + ix as f32 * dx, 0.0, oz + iz as f32 * dx));
            }
        }
        let colors = vec![hsl(0.07, 0.75, 0.5); positions.len()];
        Self {
            trigger,
            activation: Activation::new(0.0, DEFAULT_FADE_RATE, WAVEFIELD_PEAK_OPACITY),
            buffers: ParticleBuffers::from_parts(positions, colors),
            columns,
            column_phases,
            row_phases,
        }
    }

    pub fn buffers(&self) -> &ParticleBuffers {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut ParticleBuffers {
        &mut self.buffers
    }
}

impl Field for Wavefield {
    fn id(&self) -> FieldId {
        FieldId::Wavefield
    }

    fn step(&mut self, input: &FrameInput) {
        self.activation
            .step(self.trigger.is_live(input.key), input.delta);
        if self.activation.dormant() {
            return;
        }

        let t = input.elapsed;
        let envelope = 0.8 + 0.2 * (t * 0.5).sin() * (t * 0.37 + 1.2).sin();
        let amp = WAVEFIELD_AMPLITUDE * envelope;
        let hue_drift = 0.02 * (t * 0.2).sin();

        for i in 0..self.buffers.len() {
            let ix = i % self.columns;
            let iz = i / self.columns;
            let p = &mut self.buffers.positions[i];
            let (x, z) = (p.x, p.z);

            let w1 = (x * 2.0 + t * 2.4 + self.column_phases[ix]).sin();
            let w2 = (z * 2.6 + t * 1.7 + self.row_phases[iz]).sin();
            let w3 = ((x + z) * 1.4 + t * 3.1).sin();
            let y = amp * (w1 * 0.55 + w2 * 0.35 + w3 * 0.25);
            p.y = y;

            let level = (y.abs() / (amp * 1.1)).min(1.0);
            let hue = 0.02 + 0.08 * ((x + 25.0) / 50.0) + hue_drift;
            self.buffers.colors[i] = hsl(hue, 0.85, 0.45 + 0.35 * level);
        }
        self.buffers.mark_dirty();
    }

    fn activation(&self) -> &Activation {
        &self.activation
    }
}
