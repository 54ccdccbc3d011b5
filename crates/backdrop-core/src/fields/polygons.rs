use super::{Activation, Field, ParticleBuffers};
use crate::color::hsl;
use crate::constants::*;
use crate::keys::{FieldId, Trigger};
use crate::state::FrameInput;
use glam::{EulerRot, Quat, Vec3};
use rand::prelude::*;
use std::f32::consts::TAU;

/// Contiguous run of vertices forming one polygon.
#[derive(Clone, Copy, Debug)]
pub struct Polygon {
    pub first: usize,
    pub len: usize,
    phase: f32,
    speed: f32,
}

#[derive(Clone, Copy, Debug)]
struct VertexSeed {
    base: Vec3,
    phase: f32,
    amplitude: f32,
}

/// Hue/saturation/lightness shared by every polygon in the spawn zone.
#[derive(Clone, Copy, Debug)]
pub struct ZoneColor {
    pub hue: f32,
    pub sat: f32,
    pub light: f32,
}

/// Soup of translucent polygons with wireframe outlines that float, tilt and
/// ripple vertex by vertex.
pub struct PolygonField {
    trigger: Trigger,
    activation: Activation,
    buffers: ParticleBuffers,
    polygons: Vec<Polygon>,
    seeds: Vec<VertexSeed>,
    triangles: Vec<u32>,
    outline: Vec<u32>,
    zone: ZoneColor,
}

impl PolygonField {
    pub fn new(trigger: Trigger, seed: u64) -> Self {
        Self::with_count(trigger, POLYGON_COUNT, seed)
    }

    pub fn with_count(trigger: Trigger, polygon_count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let zone = ZoneColor {
            hue: rng.gen(),
            sat: rng.gen(),
            light: rng.gen(),
        };
        let [rx, ry, rz] = POLYGON_ZONE_RADIUS;

        let mut polygons = Vec::with_capacity(polygon_count);
        let mut seeds = Vec::new();
        let mut colors = Vec::new();
        let mut triangles = Vec::new();
        let mut outline = Vec::new();

        for _ in 0..polygon_count {
            let center = Vec3::new(
                (rng.gen::<f32>() - 0.5) * rx * 2.0,
                (rng.gen::<f32>() - 0.5) * ry * 2.0,
                (rng.gen::<f32>() - 0.5) * rz * 2.0,
            );
            let size = 0.8 + rng.gen::<f32>() * 1.1;
            let n = POLYGON_MIN_VERTICES + rng.gen_range(0..POLYGON_MAX_EXTRA_VERTICES);
            let first = seeds.len();

            for v in 0..n {
                let angle = (v as f32 / n as f32) * TAU + (rng.gen::<f32>() - 0.5) * 0.3;
                let radius = size * (0.8 + rng.gen::<f32>() * 0.4);
                let base = Vec3::new(
                    center.x + angle.cos() * radius,
                    center.y + angle.sin() * radius,
                    center.z + (rng.gen::<f32>() - 0.5),
                );
                colors.push(hsl(
                    zone.hue + (rng.gen::<f32>() - 0.5) * 0.4,
                    (zone.sat + (rng.gen::<f32>() - 0.5) * 0.6).clamp(0.1, 1.0),
                    (zone.light + (rng.gen::<f32>() - 0.5) * 0.4).clamp(0.1, 1.0),
                ));
                seeds.push(VertexSeed {
                    base,
                    phase: rng.gen::<f32>() * TAU,
                    amplitude: 0.4 + rng.gen::<f32>() * 0.2,
                });
            }

            // Triangle fan plus closed outline, both fixed for the field's lifetime.
            for i in 1..n - 1 {
                triangles.extend([first, first + i, first + i + 1].map(|v| v as u32));
            }
            for i in 0..n {
                outline.extend([first + i, first + (i + 1) % n].map(|v| v as u32));
            }

            polygons.push(Polygon {
                first,
                len: n,
                phase: rng.gen::<f32>() * TAU,
                speed: 0.4 + rng.gen::<f32>() * 0.6,
            });
        }

        let positions = seeds.iter().map(|s| s.base).collect();
        Self {
            trigger,
            activation: Activation::new(0.0, SLOW_FADE_RATE, POLYGON_FILL_PEAK_OPACITY),
            buffers: ParticleBuffers::from_parts(positions, colors),
            polygons,
            seeds,
            triangles,
            outline,
            zone,
        }
    }

    pub fn buffers(&self) -> &ParticleBuffers {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut ParticleBuffers {
        &mut self.buffers
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Fan-triangulated fill indices into the vertex buffers.
    pub fn triangles(&self) -> &[u32] {
        &self.triangles
    }

    /// Line-list indices tracing each polygon's outline.
    pub fn outline(&self) -> &[u32] {
        &self.outline
    }

    pub fn zone(&self) -> ZoneColor {
        self.zone
    }

    pub fn wire_color(&self) -> Vec3 {
        hsl(self.zone.hue, 0.9, 0.8)
    }

    pub fn wire_opacity(&self) -> f32 {
        self.activation.current() * POLYGON_WIRE_PEAK_OPACITY
    }
}

impl Field for PolygonField {
    fn id(&self) -> FieldId {
        FieldId::Polygons
    }

    fn step(&mut self, input: &FrameInput) {
        self.activation
            .step(self.trigger.is_live(input.key), input.delta);
        if self.activation.dormant() {
            return;
        }

        let t = input.elapsed;
        let zone = self.zone;
        for (index, poly) in self.polygons.iter().enumerate() {
            let spin = t * (0.05 + index as f32 * 0.02);
            let offset = Vec3::new(
                0.0,
                (t * poly.speed + poly.phase).sin() * 3.0,
                (t * poly.speed * 0.7 + poly.phase).cos() * 4.0,
            );
            let rotation = Quat::from_euler(EulerRot::XYZ, 0.0, spin * 0.2, spin * 0.3);

            for local in 0..poly.len {
                let i = poly.first + local;
                let seed = self.seeds[i];
                let lf = local as f32;
                let vt = t * (0.8 + lf * 0.02) + seed.phase;
                let wave = Vec3::new(
                    (vt * 0.6 + seed.phase * 2.0).sin() * seed.amplitude * 0.4,
                    (vt * 1.2).sin() * seed.amplitude * 0.8,
                    (vt * 0.9 + seed.phase).cos() * seed.amplitude * 1.2,
                );
                self.buffers.positions[i] = offset + rotation * (seed.base + wave);

                let pulse = t * 0.6 + seed.phase + lf * 0.05;
                self.buffers.colors[i] = hsl(
                    zone.hue + (pulse * 0.3).sin() * 0.1,
                    (zone.sat + (pulse * 0.5).sin() * 0.2).min(1.0),
                    (zone.light + (pulse * 0.8).sin() * 0.15).max(0.25),
                );
            }
        }
        self.buffers.mark_dirty();
    }

    fn activation(&self) -> &Activation {
        &self.activation
    }
}
