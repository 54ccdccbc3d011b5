use super::{Activation, Field};
use crate::constants::*;
use crate::keys::{FieldId, Trigger};
use crate::state::FrameInput;
use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::prelude::*;
use std::f32::consts::PI;

/// The six game props scattered through the unlink scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Clockwerk,
    Aegis,
    Awp,
    Bomb,
    SteamDeck,
    Ds3,
}

impl ModelKind {
    pub const ALL: [ModelKind; 6] = [
        ModelKind::Clockwerk,
        ModelKind::Aegis,
        ModelKind::Awp,
        ModelKind::Bomb,
        ModelKind::SteamDeck,
        ModelKind::Ds3,
    ];

    /// Scale at full activation; the source meshes were authored at wildly
    /// different units.
    pub fn base_scale(self) -> f32 {
        match self {
            ModelKind::Clockwerk => 0.05,
            ModelKind::Aegis => 4.0,
            ModelKind::Awp => 0.18,
            ModelKind::Bomb => 0.5,
            ModelKind::SteamDeck => 0.8,
            ModelKind::Ds3 => 0.002,
        }
    }

    pub fn asset_path(self) -> &'static str {
        match self {
            ModelKind::Clockwerk => "/unlink-nl/clockwerk.glb",
            ModelKind::Aegis => "/unlink-nl/aegis.gltf",
            ModelKind::Awp => "/unlink-nl/awp.gltf",
            ModelKind::Bomb => "/unlink-nl/bomb.glb",
            ModelKind::SteamDeck => "/unlink-nl/steam_deck.glb",
            ModelKind::Ds3 => "/unlink-nl/ds3.glb",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ModelInstance {
    pub kind: ModelKind,
    pub position: Vec3,
    /// XYZ Euler angles in radians.
    pub rotation: Vec3,
    pub spin: f32,
}

impl ModelInstance {
    pub fn transform(&self, scale: f32) -> Mat4 {
        let rot = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(Vec3::splat(scale), rot, self.position)
    }
}

/// Instanced props that grow in from nothing and tumble slowly.
///
/// A single activation scalar drives every instance; each instance's scale is
/// that scalar times its kind's base scale, so shrinking and growing follow
/// the same exponential law as the particle fields' opacity.
pub struct ModelField {
    trigger: Trigger,
    activation: Activation,
    instances: Vec<ModelInstance>,
    transforms: Vec<Mat4>,
    dirty: bool,
}

impl ModelField {
    pub fn new(trigger: Trigger, seed: u64) -> Self {
        Self::with_count(trigger, MODEL_INSTANCE_COUNT, seed)
    }

    pub fn with_count(trigger: Trigger, count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let instances: Vec<ModelInstance> = (0..count)
            .map(|_| {
                let kind = ModelKind::ALL[rng.gen_range(0..ModelKind::ALL.len())];
                let position = Vec3::new(
                    (rng.gen::<f32>() - 0.5) * MODEL_SPREAD,
                    (rng.gen::<f32>() - 0.5) * MODEL_SPREAD,
                    (rng.gen::<f32>() - 0.5) * MODEL_SPREAD,
                );
                let rotation = Vec3::new(
                    rng.gen::<f32>() * PI,
                    rng.gen::<f32>() * PI,
                    rng.gen::<f32>() * PI,
                );
                ModelInstance {
                    kind,
                    position,
                    rotation,
                    spin: (rng.gen::<f32>() - 0.5) * 2.0 * MODEL_MAX_SPIN,
                }
            })
            .collect();
        let transforms = instances.iter().map(|inst| inst.transform(0.0)).collect();
        Self {
            trigger,
            activation: Activation::new(0.0, SLOW_FADE_RATE, 1.0),
            instances,
            transforms,
            dirty: true,
        }
    }

    pub fn instances(&self) -> &[ModelInstance] {
        &self.instances
    }

    /// World matrices, one per instance, in the same order as [`Self::instances`].
    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }

    pub fn instance_scale(&self, index: usize) -> f32 {
        self.instances
            .get(index)
            .map(|inst| inst.kind.base_scale() * self.activation.current())
            .unwrap_or(0.0)
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

impl Field for ModelField {
    fn id(&self) -> FieldId {
        FieldId::Models
    }

    fn step(&mut self, input: &FrameInput) {
        self.activation
            .step(self.trigger.is_live(input.key), input.delta);
        if self.activation.dormant() {
            return;
        }

        let level = self.activation.current();
        for (inst, m) in self.instances.iter_mut().zip(self.transforms.iter_mut()) {
            inst.rotation.x += input.delta * inst.spin;
            inst.rotation.y += input.delta * inst.spin;
            *m = inst.transform(inst.kind.base_scale() * level);
        }
        self.dirty = true;
    }

    fn activation(&self) -> &Activation {
        &self.activation
    }
}
