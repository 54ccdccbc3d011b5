//! Sole writer of the camera: eased per-project viewpoint transitions, idle
//! auto-rotation, and choreography directives when no transition is running.

use crate::choreography::CameraDirective;
use crate::constants::*;
use crate::keys::{ActiveKey, ProjectKey};
use crate::state::{ease_in_out_cubic, Camera};
use fnv::FnvHashMap;
use glam::{Quat, Vec3};

/// Per-key camera positions. Read-only once built.
#[derive(Clone, Debug)]
pub struct Viewpoints {
    positions: FnvHashMap<ProjectKey, Vec3>,
    fallback: Vec3,
    home: Vec3,
}

impl Default for Viewpoints {
    fn default() -> Self {
        use ProjectKey::*;
        let positions = [
            (UnlinkNl, Vec3::new(0.0, 0.0, 40.0)),
            (YoutubeDm, Vec3::new(0.0, 0.0, 35.0)),
            (MentalReset, Vec3::new(0.0, 0.0, 30.0)),
            (VoxNl, Vec3::new(-8.0, 6.0, 35.0)),
            (NailSalon, Vec3::new(0.0, 0.0, 32.0)),
            (MovieBot, Vec3::new(0.0, 0.0, 1.0)),
            (TrailShade, Vec3::new(0.0, 0.0, 25.0)),
        ]
        .into_iter()
        .collect();
        Self {
            positions,
            fallback: camera_fallback(),
            home: camera_home(),
        }
    }
}

impl Viewpoints {
    pub fn empty(fallback: Vec3, home: Vec3) -> Self {
        Self {
            positions: FnvHashMap::default(),
            fallback,
            home,
        }
    }

    pub fn with(mut self, key: ProjectKey, position: Vec3) -> Self {
        self.positions.insert(key, position);
        self
    }

    /// Destination and transition length for `key`. Keys without an entry
    /// fall back to the default viewpoint.
    pub fn resolve(&self, key: ActiveKey) -> (Vec3, f32) {
        match key {
            Some(k) => (
                self.positions.get(&k).copied().unwrap_or(self.fallback),
                CAMERA_TRANSITION_SEC,
            ),
            None => (self.home, CAMERA_HOME_TRANSITION_SEC),
        }
    }
}

/// One eased move between two eye positions, also easing the look-at point
/// back to the orbit centre.
#[derive(Clone, Copy, Debug)]
pub struct Transition {
    pub from: Vec3,
    pub to: Vec3,
    look_from: Vec3,
    pub duration: f32,
    pub progress: f32,
}

impl Transition {
    fn new(from: Vec3, to: Vec3, look_from: Vec3, duration: f32) -> Self {
        Self {
            from,
            to,
            look_from,
            duration,
            progress: 0.0,
        }
    }

    /// Eye position at the current progress.
    pub fn position(&self) -> Vec3 {
        self.from
            .lerp(self.to, ease_in_out_cubic(self.progress.min(1.0)))
    }

    fn look_at(&self) -> Vec3 {
        self.look_from
            .lerp(Vec3::ZERO, ease_in_out_cubic(self.progress.min(1.0)))
    }
}

/// Interaction switches handed to the host's pointer controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Controls {
    pub rotate: bool,
    pub zoom: bool,
    pub pan: bool,
    pub auto_rotate: bool,
}

pub struct CameraRig {
    viewpoints: Viewpoints,
    eye: Vec3,
    target: Vec3,
    key: ActiveKey,
    transition: Option<Transition>,
}

impl CameraRig {
    pub fn new(viewpoints: Viewpoints, eye: Vec3) -> Self {
        Self {
            viewpoints,
            eye,
            target: Vec3::ZERO,
            key: None,
            transition: None,
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn key(&self) -> ActiveKey {
        self.key
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    pub fn transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Start a transition if the key changed. The move always begins at the
    /// current eye, so an interrupted transition continues smoothly.
    pub fn set_key(&mut self, key: ActiveKey) -> bool {
        if key == self.key {
            return false;
        }
        self.key = key;
        let (to, duration) = self.viewpoints.resolve(key);
        log::debug!(
            "camera: {} -> {to} over {duration}s",
            key.map_or("none", ProjectKey::as_str)
        );
        self.transition = Some(Transition::new(self.eye, to, self.target, duration));
        true
    }

    pub fn auto_rotate_allowed(key: ActiveKey) -> bool {
        matches!(
            key,
            None | Some(ProjectKey::UnlinkNl | ProjectKey::VoxNl | ProjectKey::MovieBot)
        )
    }

    pub fn controls(&self) -> Controls {
        Controls {
            rotate: true,
            zoom: false,
            pan: false,
            auto_rotate: !self.transitioning() && Self::auto_rotate_allowed(self.key),
        }
    }

    pub fn step(&mut self, delta: f32) {
        let dt = delta.max(0.0);
        if let Some(tr) = self.transition.as_mut() {
            tr.progress += dt / tr.duration.max(0.001);
            if tr.progress >= 1.0 {
                self.eye = tr.to;
                self.target = Vec3::ZERO;
                self.transition = None;
            } else {
                self.eye = tr.position();
                self.target = tr.look_at();
            }
            return;
        }

        if self.controls().auto_rotate {
            // Orbit-control speed units: `speed` full turns per 60 s.
            let angle = std::f32::consts::TAU * AUTO_ROTATE_SPEED / 60.0 * dt;
            self.eye = self.target + Quat::from_rotation_y(-angle) * (self.eye - self.target);
        }
    }

    /// Follow a choreography directive. Refused while a transition owns the
    /// camera.
    pub fn apply_directive(&mut self, directive: &CameraDirective) -> bool {
        if self.transitioning() {
            return false;
        }
        self.eye = self.eye.lerp(directive.position, directive.position_alpha);
        self.target = self.target.lerp(directive.look_at, directive.look_alpha);
        true
    }

    pub fn camera(&self, aspect: f32) -> Camera {
        let mut camera = Camera::new(self.eye, aspect);
        camera.target = self.target;
        camera
    }
}
