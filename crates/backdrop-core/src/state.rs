//! Frame-level state shared by every field, the camera rig and the host.
//!
//! These types intentionally avoid referencing platform-specific APIs so the
//! whole simulation can be stepped from host-side tests as well as from the
//! browser's animation-frame callback.

use crate::keys::ActiveKey;
use glam::{Mat4, Vec3};

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(eye: Vec3, aspect: f32) -> Self {
        Self {
            eye,
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect,
            fovy_radians: crate::constants::CAMERA_FOV_DEGREES.to_radians(),
            znear: 0.1,
            zfar: 500.0,
        }
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
}

/// A flat quad taken from an instance transform: centre, edge length and
/// the in-plane axes. A zero-scale transform gives zero axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Billboard {
    pub center: Vec3,
    pub size: f32,
    pub right: Vec3,
    pub up: Vec3,
}

impl Billboard {
    pub fn from_transform(m: &Mat4) -> Self {
        let x = m.x_axis.truncate();
        let y = m.y_axis.truncate();
        Self {
            center: m.w_axis.truncate(),
            size: x.length(),
            right: x.normalize_or_zero(),
            up: y.normalize_or_zero(),
        }
    }

    /// Face normal; local +Z of the source transform.
    pub fn normal(&self) -> Vec3 {
        self.right.cross(self.up)
    }
}

/// Monotonic clock advanced once per display frame by the host loop.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameClock {
    pub elapsed: f64,
    pub delta: f32,
}

impl FrameClock {
    pub fn advance(&mut self, delta: f32) {
        // Negative or NaN deltas (tab switches, clock skew) count as a stalled frame.
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        self.delta = delta;
        self.elapsed += delta as f64;
    }
}

/// Everything a field may read during its per-frame step.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
    pub elapsed: f32,
    pub delta: f32,
    pub key: ActiveKey,
    pub camera_eye: Vec3,
}

impl FrameInput {
    pub fn new(clock: &FrameClock, key: ActiveKey, camera_eye: Vec3) -> Self {
        Self {
            elapsed: clock.elapsed as f32,
            delta: clock.delta,
            key,
            camera_eye,
        }
    }
}

#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Frame-rate independent smoothing factor for exponential damping.
#[inline]
pub fn damping_alpha(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate.max(0.0) * dt).exp()
}

#[inline]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}
