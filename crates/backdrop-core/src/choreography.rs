//! The looping nail-salon vignette: a hand slides into a UV dryer, the nail
//! texture crossfades to a freshly picked one, and the hand slides back out.
//!
//! Everything here is driven by the choreography's own loop clock, which
//! starts at zero when the compositor mounts it.

use crate::constants::*;
use crate::error::{CoreError, Result};
use crate::state::{clamp01, damping_alpha, ease_in_out_cubic};
use glam::{EulerRot, Quat, Vec3};
use rand::prelude::*;
use std::f32::consts::{PI, TAU};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Enter,
    EnterEnd,
    Curing,
    ExitStart,
    Exit,
    Idle,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Enter,
        Phase::EnterEnd,
        Phase::Curing,
        Phase::ExitStart,
        Phase::Exit,
        Phase::Idle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Enter => "enter",
            Phase::EnterEnd => "enterEnd",
            Phase::Curing => "curing",
            Phase::ExitStart => "exitStart",
            Phase::Exit => "exit",
            Phase::Idle => "idle",
        }
    }

    /// Phases during which the camera frames the dryer instead of the hand.
    pub fn focuses_prop(self) -> bool {
        matches!(self, Phase::EnterEnd | Phase::Curing | Phase::ExitStart)
    }
}

/// Six back-to-back phases whose boundaries are cumulative sums of their
/// durations. The timeline loops with period [`Timeline::total`].
#[derive(Clone, Copy, Debug)]
pub struct Timeline {
    durations: [f32; 6],
    ends: [f32; 6],
}

impl Timeline {
    pub fn new(durations: [f32; 6]) -> Result<Self> {
        let mut ends = [0.0; 6];
        let mut acc = 0.0;
        for (i, d) in durations.iter().copied().enumerate() {
            if !(d > 0.0 && d.is_finite()) {
                return Err(CoreError::NonPositivePhase {
                    phase: Phase::ALL[i].as_str(),
                    duration: d,
                });
            }
            acc += d;
            ends[i] = acc;
        }
        Ok(Self { durations, ends })
    }

    #[inline]
    pub fn total(&self) -> f32 {
        self.ends[5]
    }

    pub fn shortest(&self) -> f32 {
        self.durations.iter().copied().fold(f32::INFINITY, f32::min)
    }

    pub fn duration(&self, phase: Phase) -> f32 {
        self.durations[phase as usize]
    }

    /// Loop time at which `phase` begins.
    pub fn start(&self, phase: Phase) -> f32 {
        match phase as usize {
            0 => 0.0,
            i => self.ends[i - 1],
        }
    }

    /// Phase containing `t mod total`.
    pub fn phase_at(&self, t: f32) -> Phase {
        let t = t.rem_euclid(self.total());
        Phase::ALL
            .iter()
            .zip(self.ends.iter())
            .find(|(_, end)| t < **end)
            .map(|(p, _)| *p)
            .unwrap_or(Phase::Idle)
    }
}

impl Default for Timeline {
    fn default() -> Self {
        let durations = [1.2, 1.2, 3.4, 1.0, 1.2, 1.4];
        let mut ends = [0.0; 6];
        let mut acc = 0.0;
        for (end, d) in ends.iter_mut().zip(durations) {
            acc += d;
            *end = acc;
        }
        Self { durations, ends }
    }
}

/// Choose the next texture index. With two or more textures the current one
/// is rejected up to [`TEXTURE_PICK_ATTEMPTS`] times, after which its
/// neighbour is taken so the result never repeats.
pub fn pick_next_texture<R: Rng + ?Sized>(rng: &mut R, current: usize, count: usize) -> Option<usize> {
    match count {
        0 => None,
        1 => Some(0),
        n => {
            let mut next = rng.gen_range(0..n);
            let mut attempts = 0;
            while next == current && attempts < TEXTURE_PICK_ATTEMPTS {
                next = rng.gen_range(0..n);
                attempts += 1;
            }
            if next == current {
                next = (current + 1) % n;
            }
            Some(next)
        }
    }
}

/// Where the camera should head this frame. The alphas are this frame's
/// damping factors for the eye and the look-at point respectively.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraDirective {
    pub position: Vec3,
    pub position_alpha: f32,
    pub look_at: Vec3,
    pub look_alpha: f32,
}

#[derive(Clone, Debug)]
pub struct ChoreographyConfig {
    pub timeline: Timeline,
    pub texture_count: usize,
    pub base_position: Vec3,
    pub base_scale: f32,
    pub dryer_position: Vec3,
    pub hand_position: Vec3,
    pub hand_scale: f32,
    /// XYZ Euler angles, radians.
    pub hand_rotation: Vec3,
    pub hand_inside_rotation: Vec3,
    pub enter_z: f32,
    pub inside_z: f32,
    pub view_camera_offset: Vec3,
    pub view_look_at_offset: Vec3,
    pub dryer_camera_offset: Vec3,
    pub camera_distance_base: f32,
    pub camera_lerp_base: f32,
    pub camera_rot_lerp_base: f32,
}

impl Default for ChoreographyConfig {
    fn default() -> Self {
        Self {
            timeline: Timeline::default(),
            texture_count: NAIL_TEXTURE_COUNT,
            base_position: Vec3::new(0.0, -1.0, 0.0),
            base_scale: 1.8,
            dryer_position: Vec3::ZERO,
            hand_position: Vec3::new(0.1, 0.36, 2.0),
            hand_scale: 0.1,
            hand_rotation: Vec3::new(PI * 1.55, PI, 0.0),
            hand_inside_rotation: Vec3::new(PI * 1.55, PI, 0.0),
            enter_z: 2.0,
            inside_z: 0.25,
            view_camera_offset: Vec3::new(0.0, -1.0, -4.5),
            view_look_at_offset: Vec3::new(0.0, -1.5, -4.0),
            dryer_camera_offset: Vec3::new(-2.0, 1.0, 3.4),
            camera_distance_base: 1.2,
            camera_lerp_base: 6.5,
            camera_rot_lerp_base: 6.5,
        }
    }
}

impl ChoreographyConfig {
    fn outside_z(&self) -> f32 {
        self.enter_z + self.hand_position.z
    }

    fn inside_z(&self) -> f32 {
        self.inside_z + self.hand_position.z
    }

    fn to_world(&self, local: Vec3) -> Vec3 {
        self.base_position + local * self.base_scale
    }
}

pub fn nail_texture_path(index: usize) -> String {
    match index {
        0 => "/nail-salon/textures/038F_05SET_04SHOT_DIFFUSE.png".to_string(),
        i => format!("/nail-salon/textures/038F_05SET_04SHOT_DIFFUSE_{i}.png"),
    }
}

pub const HAND_MODEL_PATH: &str = "/nail-salon/hand.glb";
pub const DRYER_MODEL_PATH: &str = "/nail-salon/dryer.gltf";

/// Which nail texture is shown where.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NailSurface {
    pub base_texture: usize,
    pub overlay_texture: usize,
    pub overlay_opacity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CuringLight {
    pub intensity: f32,
    pub hue: f32,
}

pub struct Choreography {
    config: ChoreographyConfig,
    rng: StdRng,
    loop_time: f32,
    phase: Phase,
    phase_start: f32,
    current_texture: usize,
    next_texture: Option<usize>,
    overlay_texture: usize,
    overlay_opacity: f32,
    blend: f32,
    hand_z: f32,
    hand_rotation: Quat,
    light: CuringLight,
    sparkle_opacity: f32,
    sparkles: Vec<Vec3>,
}

/// True when an eye at `eye` looks at `nail` within the re-aim cone around
/// `forward`.
pub fn views_along(eye: Vec3, nail: Vec3, forward: Vec3) -> bool {
    (nail - eye).normalize_or_zero().dot(forward) >= REAIM_DOT_THRESHOLD
}

fn quat_from_euler(v: Vec3) -> Quat {
    Quat::from_euler(EulerRot::XYZ, v.x, v.y, v.z)
}

impl Choreography {
    pub fn new(config: ChoreographyConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let anchor = config.dryer_position + Vec3::new(0.0, 1.0, 0.25);
        let sparkles = (0..SPARKLE_COUNT)
            .map(|_| {
                let r = rng.gen::<f32>() * 0.9;
                let ang = rng.gen::<f32>() * TAU;
                let local = Vec3::new(
                    ang.cos() * r * 0.6,
                    (rng.gen::<f32>() - 0.5) * 0.6,
                    ang.sin() * r * 0.6,
                );
                config.to_world(anchor + local)
            })
            .collect();
        let hand_rotation = quat_from_euler(config.hand_rotation);
        Self {
            hand_z: config.outside_z(),
            hand_rotation,
            rng,
            loop_time: 0.0,
            // Starts as idle so the first step registers the move into `enter`.
            phase: Phase::Idle,
            phase_start: 0.0,
            current_texture: 0,
            next_texture: None,
            overlay_texture: 0,
            overlay_opacity: 0.0,
            blend: 0.0,
            light: CuringLight {
                intensity: 0.0,
                hue: 0.72,
            },
            sparkle_opacity: 0.0,
            sparkles,
            config,
        }
    }

    pub fn config(&self) -> &ChoreographyConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn loop_time(&self) -> f32 {
        self.loop_time
    }

    pub fn surface(&self) -> NailSurface {
        NailSurface {
            base_texture: self.current_texture,
            overlay_texture: self.overlay_texture,
            overlay_opacity: self.overlay_opacity,
        }
    }

    pub fn light(&self) -> CuringLight {
        self.light
    }

    pub fn sparkle_opacity(&self) -> f32 {
        self.sparkle_opacity
    }

    /// World-space sparkle positions; the layout never changes.
    pub fn sparkles(&self) -> &[Vec3] {
        &self.sparkles
    }

    pub fn hand_z(&self) -> f32 {
        self.hand_z
    }

    pub fn hand_rotation(&self) -> Quat {
        self.hand_rotation
    }

    pub fn hand_world_position(&self) -> Vec3 {
        let p = self.config.hand_position;
        self.config.to_world(Vec3::new(p.x, p.y, self.hand_z))
    }

    pub fn dryer_world_position(&self) -> Vec3 {
        self.config.to_world(self.config.dryer_position)
    }

    /// Advance the loop clock by `delta` and return this frame's camera move.
    ///
    /// Long deltas are split into sub-steps no longer than the shortest
    /// phase, so every phase entered on the way is observed. More than one
    /// full loop is folded down to a single loop.
    pub fn step(&mut self, delta: f32) -> CameraDirective {
        let timeline = self.config.timeline;
        let mut remaining = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        if remaining > timeline.total() {
            remaining = timeline.total() + remaining % timeline.total();
        }
        let max_step = timeline.shortest();
        loop {
            let dt = remaining.min(max_step);
            remaining -= dt;
            let directive = self.advance(dt);
            if remaining <= 0.0 {
                return directive;
            }
        }
    }

    fn advance(&mut self, dt: f32) -> CameraDirective {
        let timeline = self.config.timeline;
        self.loop_time = (self.loop_time + dt) % timeline.total();
        let t = self.loop_time;

        let phase = timeline.phase_at(t);
        if phase != self.phase {
            self.enter_phase(phase, t);
        }

        let progress = clamp01((t - self.phase_start) / timeline.duration(phase).max(1e-6));
        let speed = 0.15 + 0.85 * ease_in_out_cubic(progress);

        self.step_hand(t, dt, speed);
        self.step_light(t, dt);
        self.step_surface(t, dt);
        self.directive(dt, speed)
    }

    fn enter_phase(&mut self, phase: Phase, t: f32) {
        log::debug!("nail-salon: {} -> {}", self.phase.as_str(), phase.as_str());
        self.phase = phase;
        self.phase_start = t;
        if phase == Phase::Curing {
            self.next_texture =
                pick_next_texture(&mut self.rng, self.current_texture, self.config.texture_count);
            if let Some(next) = self.next_texture {
                self.overlay_texture = next;
            }
            self.overlay_opacity = 0.0;
            self.blend = 0.0;
        }
    }

    fn step_hand(&mut self, t: f32, dt: f32, speed: f32) {
        let tl = self.config.timeline;
        let outside = self.config.outside_z();
        let inside = self.config.inside_z();
        let (desired, rate) = match self.phase {
            Phase::Enter | Phase::EnterEnd => {
                let span = tl.duration(Phase::Enter) + tl.duration(Phase::EnterEnd);
                let k = ease_in_out_cubic(clamp01(t / span));
                (outside + (inside - outside) * k, 12.0)
            }
            Phase::Curing => (inside, 10.0),
            Phase::ExitStart | Phase::Exit => {
                let span = tl.duration(Phase::ExitStart) + tl.duration(Phase::Exit);
                let k = ease_in_out_cubic(clamp01((t - tl.start(Phase::ExitStart)) / span));
                (inside + (outside - inside) * k, 12.0)
            }
            Phase::Idle => (outside, 12.0),
        };
        self.hand_z += (desired - self.hand_z) * damping_alpha(rate, dt);

        let target = if self.phase.focuses_prop() {
            quat_from_euler(self.config.hand_inside_rotation)
        } else {
            quat_from_euler(self.config.hand_rotation)
        };
        self.hand_rotation = self
            .hand_rotation
            .slerp(target, damping_alpha(8.0 * speed, dt));
    }

    fn step_light(&mut self, t: f32, dt: f32) {
        match self.phase {
            Phase::EnterEnd | Phase::Curing => {
                let local = (t - self.config.timeline.start(Phase::EnterEnd)).max(0.0);
                let pulse = 1.2 + 0.6 * (local * 10.0).sin();
                self.light.intensity +=
                    (pulse * 1.5 - self.light.intensity) * damping_alpha(12.0, dt);
                self.light.hue = 0.72 + 0.03 * (local * 3.2).sin();
            }
            _ => self.light.intensity -= self.light.intensity * damping_alpha(8.0, dt),
        }
        let sparkle_target = if self.phase == Phase::Curing { 0.95 } else { 0.0 };
        self.sparkle_opacity += (sparkle_target - self.sparkle_opacity) * damping_alpha(6.0, dt);
    }

    fn step_surface(&mut self, t: f32, dt: f32) {
        match (self.phase, self.next_texture) {
            (Phase::Curing, Some(next)) => {
                let tl = self.config.timeline;
                let local = clamp01((t - tl.start(Phase::Curing)) / tl.duration(Phase::Curing));
                let target = ease_in_out_cubic(clamp01(local / CURING_BLEND_WINDOW));
                self.blend += (target - self.blend) * damping_alpha(8.0, dt);
                self.overlay_opacity = self.blend;
                if self.blend > OVERLAY_COMMIT_THRESHOLD {
                    log::debug!("nail-salon: committed texture {next}");
                    self.current_texture = next;
                    self.next_texture = None;
                    self.overlay_opacity = 0.0;
                }
            }
            _ => {
                if self.overlay_opacity > 1e-3 {
                    self.overlay_opacity -= self.overlay_opacity * damping_alpha(6.0, dt);
                }
            }
        }
    }

    fn directive(&self, dt: f32, speed: f32) -> CameraDirective {
        let cfg = &self.config;
        let position_alpha = damping_alpha(cfg.camera_lerp_base * speed, dt);
        let look_alpha = damping_alpha(cfg.camera_rot_lerp_base * speed, dt);

        let (position, look_at) = if self.phase.focuses_prop() {
            let dryer = self.dryer_world_position();
            (dryer + cfg.dryer_camera_offset, dryer + Vec3::new(0.0, 0.12, 0.0))
        } else {
            let nail = cfg.to_world(
                Vec3::new(cfg.hand_position.x, cfg.hand_position.y, self.hand_z)
                    + self.hand_rotation * (Vec3::new(0.0, 0.12, -0.12) * cfg.hand_scale),
            );
            let forward = (self.hand_rotation * Vec3::Z).normalize_or_zero();
            let distance =
                (cfg.camera_distance_base / cfg.hand_scale.max(0.001) * 0.92).clamp(0.5, 3.5);
            let lift = Vec3::new(0.0, 0.12 * cfg.hand_scale, 0.0);

            let mut desired = nail - forward * distance + lift + cfg.view_camera_offset;
            if !views_along(desired, nail, forward) {
                // The offset carried the eye off the hand's axis; sit on it.
                desired = nail - forward * distance + lift;
            }
            (desired, nail + cfg.view_look_at_offset)
        };

        CameraDirective {
            position,
            position_alpha,
            look_at,
            look_alpha,
        }
    }
}
