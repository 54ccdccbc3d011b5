//! Camera-facing poster cloud with a progressive activation ramp.

use crate::constants::*;
use crate::fields::{Activation, Field};
use crate::keys::{FieldId, Trigger};
use crate::state::FrameInput;
use glam::{Mat3, Mat4, Quat, Vec3};
use rand::prelude::*;
use std::f32::consts::TAU;

#[derive(Clone, Debug)]
pub struct PosterConfig {
    pub texture_count: usize,
    pub total_images: usize,
    /// Seconds between ramp batches when the host does not promote them itself.
    pub idle_interval: f64,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            texture_count: POSTER_TEXTURE_COUNT,
            total_images: POSTER_TOTAL_IMAGES,
            idle_interval: POSTER_IDLE_INTERVAL,
        }
    }
}

impl PosterConfig {
    pub fn per_texture(&self) -> usize {
        if self.texture_count == 0 {
            0
        } else {
            self.total_images.div_ceil(self.texture_count)
        }
    }

    pub fn element_count(&self) -> usize {
        self.per_texture() * self.texture_count
    }
}

pub fn poster_texture_path(index: usize) -> String {
    format!("/moviebot/bg/{}.webp", index + 1)
}

/// Number of live elements, grown batch by batch up to the full set.
#[derive(Clone, Copy, Debug)]
pub struct ActivationRamp {
    live: usize,
    len: usize,
    batch: usize,
    interval: f64,
    next_at: Option<f64>,
}

impl ActivationRamp {
    pub fn new(len: usize, interval: f64) -> Self {
        let initial = ((len as f32 * 0.2) as usize).clamp(20, 120).min(len);
        Self {
            live: initial,
            len,
            batch: (len / 8).max(5),
            interval,
            next_at: None,
        }
    }

    #[inline]
    pub fn live(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn complete(&self) -> bool {
        self.live >= self.len
    }

    pub fn promote(&mut self) {
        self.live = (self.live + self.batch).min(self.len);
    }

    /// Promote at most one batch per idle slot. The first slot opens one
    /// interval after the first tick.
    pub fn tick(&mut self, now: f64) {
        if self.complete() {
            return;
        }
        match self.next_at {
            None => self.next_at = Some(now + self.interval),
            Some(at) if now >= at => {
                self.promote();
                self.next_at = Some(now + self.interval);
            }
            Some(_) => {}
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct PosterSeed {
    base: Vec3,
    phase: f32,
    wobble: f32,
    roll_seed: f32,
}

/// Billboards carrying the movie posters. Element `i` shows texture
/// `i % texture_count`, so every live prefix already samples the whole set.
pub struct PosterField {
    trigger: Trigger,
    activation: Activation,
    ramp: ActivationRamp,
    seeds: Vec<PosterSeed>,
    textures: Vec<u16>,
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    transforms: Vec<Mat4>,
    dirty: bool,
}

impl PosterField {
    pub fn new(trigger: Trigger, seed: u64) -> Self {
        Self::with_config(trigger, &PosterConfig::default(), seed)
    }

    pub fn with_config(trigger: Trigger, config: &PosterConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let len = config.element_count();
        let mut seeds = Vec::with_capacity(len);
        let mut textures = Vec::with_capacity(len);
        for i in 0..len {
            let tex = i % config.texture_count.max(1);
            let spread = POSTER_BASE_SPREAD + POSTER_SPREAD_PER_TEXTURE * tex as f32;
            seeds.push(PosterSeed {
                base: random_on_sphere(&mut rng, spread),
                phase: rng.gen::<f32>() * TAU,
                wobble: rng.gen::<f32>() * 0.8,
                roll_seed: rng.gen::<f32>() * 1000.0,
            });
            textures.push(tex as u16);
        }
        let positions: Vec<Vec3> = seeds.iter().map(|s| s.base).collect();
        let transforms = positions.iter().map(|p| Mat4::from_translation(*p)).collect();
        Self {
            trigger,
            activation: Activation::new(0.0, DEFAULT_FADE_RATE, 1.0),
            ramp: ActivationRamp::new(len, config.idle_interval),
            seeds,
            textures,
            positions,
            velocities: vec![Vec3::ZERO; len],
            transforms,
            dirty: true,
        }
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    pub fn ramp(&self) -> &ActivationRamp {
        &self.ramp
    }

    /// Lets the host promote a batch from its own idle callback.
    pub fn promote_batch(&mut self) {
        self.ramp.promote();
    }

    pub fn live_transforms(&self) -> &[Mat4] {
        &self.transforms[..self.ramp.live()]
    }

    pub fn live_textures(&self) -> &[u16] {
        &self.textures[..self.ramp.live()]
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Where the spring pulls element `i` at time `t`: its home on the
    /// sphere plus a slow per-element drift.
    pub fn target(&self, i: usize, t: f32) -> Vec3 {
        let s = &self.seeds[i];
        let (ph, wb) = (s.phase, s.wobble);
        let noise = Vec3::new(
            (ph + t * (0.2 + wb * 0.5)).sin() * (1.5 + wb),
            (ph * 1.1 + t * (0.15 + wb * 0.35)).cos() * (0.8 + wb * 0.6),
            (ph * 0.7 + t * (0.18 + wb * 0.3)).sin() * 0.7,
        );
        s.base + noise
    }
}

impl Field for PosterField {
    fn id(&self) -> FieldId {
        FieldId::Posters
    }

    fn step(&mut self, input: &FrameInput) {
        self.ramp.tick(input.elapsed as f64);
        self.activation
            .step(self.trigger.is_live(input.key), input.delta);
        if self.activation.dormant() {
            return;
        }

        let t = input.elapsed;
        let dt = input.delta;
        for i in 0..self.ramp.live() {
            let s = self.seeds[i];
            let target = self.target(i, t);

            let v = &mut self.velocities[i];
            *v += (target - self.positions[i]) * (dt * POSTER_SPRING_K);
            *v *= POSTER_DAMPING;
            self.positions[i] += *v * (dt * POSTER_VELOCITY_SCALE);

            let p = self.positions[i];
            let roll = 0.02 * (s.roll_seed + t * 1.25).sin();
            let rotation = facing(p, input.camera_eye) * Quat::from_rotation_z(roll);
            let scale = POSTER_PLANE_SCALE * (0.8 + 0.3 * (s.phase + t * 0.9).sin());
            self.transforms[i] = Mat4::from_scale_rotation_translation(Vec3::splat(scale), rotation, p);
        }
        self.dirty = true;
    }

    fn activation(&self) -> &Activation {
        &self.activation
    }
}

fn random_on_sphere(rng: &mut StdRng, radius: f32) -> Vec3 {
    let theta = rng.gen::<f32>() * TAU;
    let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.sin() * theta.sin(),
        radius * phi.cos(),
    )
}

/// Orientation whose local +Z points from `from` toward `eye`.
pub fn facing(from: Vec3, eye: Vec3) -> Quat {
    let Some(z) = (eye - from).try_normalize() else {
        return Quat::IDENTITY;
    };
    let up = if z.y.abs() > 0.999 { Vec3::Z } else { Vec3::Y };
    let x = up.cross(z).normalize();
    let y = z.cross(x);
    Quat::from_mat3(&Mat3::from_cols(x, y, z))
}
