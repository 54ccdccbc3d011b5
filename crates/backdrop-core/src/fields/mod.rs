//! Continuously simulated background layers.
//!
//! Every field owns fixed-size buffers allocated at construction and a
//! closed-form per-frame update. A field only reads the [`FrameInput`] it is
//! handed; it never looks at another field.

use crate::constants::VISIBILITY_EPSILON;
use crate::keys::FieldId;
use crate::state::FrameInput;
use glam::Vec3;

pub mod breather;
pub mod models;
pub mod polygons;
pub mod starfield;
pub mod wavefield;

pub use breather::Breather;
pub use models::{ModelField, ModelInstance, ModelKind};
pub use polygons::PolygonField;
pub use starfield::Starfield;
pub use wavefield::Wavefield;

/// Opacity state of one field. `current` stays in [0, 1]; `peak` is the
/// material opacity the renderer uses at full activation.
#[derive(Clone, Copy, Debug)]
pub struct Activation {
    current: f32,
    target: f32,
    pub fade_rate: f32,
    pub peak: f32,
}

impl Activation {
    pub fn new(initial: f32, fade_rate: f32, peak: f32) -> Self {
        let current = initial.clamp(0.0, 1.0);
        Self {
            current,
            target: current,
            fade_rate,
            peak,
        }
    }

    /// Move toward the live/idle target. The smoothing factor is capped at 1
    /// so a long frame lands on the target instead of overshooting it.
    pub fn step(&mut self, live: bool, delta: f32) {
        self.target = if live { 1.0 } else { 0.0 };
        let k = (delta.max(0.0) * self.fade_rate).min(1.0);
        self.current = (self.current + (self.target - self.current) * k).clamp(0.0, 1.0);
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn visible(&self) -> bool {
        self.current > VISIBILITY_EPSILON
    }

    /// True when the field is faded out and staying that way, so its
    /// per-element update can be skipped.
    #[inline]
    pub fn dormant(&self) -> bool {
        self.current <= VISIBILITY_EPSILON && self.target == 0.0
    }

    /// Opacity to hand to the material.
    #[inline]
    pub fn opacity(&self) -> f32 {
        self.current * self.peak
    }
}

/// Position/color arena for a point-like field.
#[derive(Clone, Debug)]
pub struct ParticleBuffers {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    dirty: bool,
}

impl ParticleBuffers {
    pub fn new(count: usize, position: Vec3, color: Vec3) -> Self {
        Self {
            positions: vec![position; count],
            colors: vec![color; count],
            dirty: true,
        }
    }

    pub fn from_parts(positions: Vec<Vec3>, colors: Vec<Vec3>) -> Self {
        debug_assert_eq!(positions.len(), colors.len());
        Self {
            positions,
            colors,
            dirty: true,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether an upload is due and clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

pub trait Field {
    fn id(&self) -> FieldId;
    fn step(&mut self, input: &FrameInput);
    fn activation(&self) -> &Activation;

    fn visible(&self) -> bool {
        self.activation().visible()
    }
}
