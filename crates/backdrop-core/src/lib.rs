pub mod camera_rig;
pub mod catalog;
pub mod choreography;
pub mod color;
pub mod compositor;
pub mod constants;
pub mod dialogue;
pub mod error;
pub mod facts;
pub mod fields;
pub mod keys;
pub mod poster;
pub mod readiness;
pub mod state;

pub use camera_rig::{CameraRig, Controls, Viewpoints};
pub use choreography::{CameraDirective, Choreography, ChoreographyConfig, Phase, Timeline};
pub use compositor::{AssetGroup, Compositor};
pub use error::{CoreError, Result};
pub use fields::{Activation, Field, ParticleBuffers};
pub use keys::*;
pub use poster::{PosterConfig, PosterField};
pub use readiness::{GateTimings, LoadProgress, ReadinessGate};
pub use state::*;
