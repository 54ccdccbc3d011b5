//! Owns every field and drives them once per frame.

use crate::choreography::{
    nail_texture_path, CameraDirective, Choreography, ChoreographyConfig, DRYER_MODEL_PATH,
    HAND_MODEL_PATH,
};
use crate::constants::POSTER_LINGER_SEC;
use crate::fields::{Breather, Field, ModelField, ModelKind, PolygonField, Starfield, Wavefield};
use crate::keys::{ActivationTable, ActiveKey, FieldId};
use crate::poster::{poster_texture_path, PosterConfig, PosterField};
use crate::state::{FrameClock, FrameInput};
use glam::Vec3;
use rand::prelude::*;
use smallvec::SmallVec;

/// Assets a mounted layer pulls in, as counted by the host's loader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetGroup {
    Models,
    Posters,
    NailSalon,
}

impl AssetGroup {
    pub fn paths(self, posters: &PosterConfig, choreography: &ChoreographyConfig) -> Vec<String> {
        match self {
            AssetGroup::Models => ModelKind::ALL
                .iter()
                .map(|k| k.asset_path().to_string())
                .collect(),
            AssetGroup::Posters => (0..posters.texture_count).map(poster_texture_path).collect(),
            AssetGroup::NailSalon => [DRYER_MODEL_PATH.to_string(), HAND_MODEL_PATH.to_string()]
                .into_iter()
                .chain((0..choreography.texture_count).map(nail_texture_path))
                .collect(),
        }
    }
}

pub struct Compositor {
    table: ActivationTable,
    starfield: Starfield,
    breather: Breather,
    wavefield: Wavefield,
    polygons: PolygonField,
    models: ModelField,
    poster_config: PosterConfig,
    poster_seed: u64,
    posters: Option<PosterField>,
    poster_unmount_at: Option<f64>,
    choreography_config: ChoreographyConfig,
    choreography: Option<Choreography>,
    mount_rng: StdRng,
}

impl Compositor {
    pub fn new(table: ActivationTable, seed: u64) -> Self {
        Self::with_configs(
            table,
            seed,
            PosterConfig::default(),
            ChoreographyConfig::default(),
        )
    }

    pub fn with_configs(
        table: ActivationTable,
        seed: u64,
        poster_config: PosterConfig,
        choreography_config: ChoreographyConfig,
    ) -> Self {
        // One stream per layer, split off the base seed.
        let sub = |i: u64| seed ^ i.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Self {
            starfield: Starfield::new(table.trigger(FieldId::Starfield), sub(1)),
            breather: Breather::new(table.trigger(FieldId::Breather), sub(2)),
            wavefield: Wavefield::new(table.trigger(FieldId::Wavefield), sub(3)),
            polygons: PolygonField::new(table.trigger(FieldId::Polygons), sub(4)),
            models: ModelField::new(table.trigger(FieldId::Models), sub(5)),
            poster_seed: sub(6),
            mount_rng: StdRng::seed_from_u64(sub(7)),
            poster_config,
            posters: None,
            poster_unmount_at: None,
            choreography_config,
            choreography: None,
            table,
        }
    }

    /// Step every field for this frame. Returns the choreography's camera
    /// directive while it is mounted.
    pub fn step(
        &mut self,
        clock: &FrameClock,
        key: ActiveKey,
        camera_eye: Vec3,
    ) -> Option<CameraDirective> {
        let input = FrameInput::new(clock, key, camera_eye);
        self.starfield.step(&input);
        self.breather.step(&input);
        self.wavefield.step(&input);
        self.polygons.step(&input);
        self.models.step(&input);

        self.update_poster_mount(key, clock.elapsed);
        if let Some(posters) = self.posters.as_mut() {
            posters.step(&input);
        }

        if self.table.is_live(FieldId::Choreography, key) {
            let choreography = self.choreography.get_or_insert_with(|| {
                log::debug!("compositor: mounting nail-salon choreography");
                Choreography::new(self.choreography_config.clone(), self.mount_rng.gen())
            });
            Some(choreography.step(clock.delta))
        } else {
            if self.choreography.take().is_some() {
                log::debug!("compositor: unmounted nail-salon choreography");
            }
            None
        }
    }

    fn update_poster_mount(&mut self, key: ActiveKey, now: f64) {
        if self.table.is_live(FieldId::Posters, key) {
            self.poster_unmount_at = None;
            if self.posters.is_none() {
                log::debug!("compositor: mounting poster field");
                self.posters = Some(PosterField::with_config(
                    self.table.trigger(FieldId::Posters),
                    &self.poster_config,
                    self.poster_seed,
                ));
            }
            return;
        }
        if self.posters.is_none() {
            return;
        }
        match self.poster_unmount_at {
            None => self.poster_unmount_at = Some(now + POSTER_LINGER_SEC),
            Some(at) if now >= at => {
                log::debug!("compositor: unmounted poster field");
                self.posters = None;
                self.poster_unmount_at = None;
            }
            Some(_) => {}
        }
    }

    /// Asset groups whose layers are mounted right now.
    pub fn mounted_asset_groups(&self) -> SmallVec<[AssetGroup; 3]> {
        let mut groups = SmallVec::new();
        groups.push(AssetGroup::Models);
        if self.posters.is_some() {
            groups.push(AssetGroup::Posters);
        }
        if self.choreography.is_some() {
            groups.push(AssetGroup::NailSalon);
        }
        groups
    }

    pub fn asset_paths(&self, group: AssetGroup) -> Vec<String> {
        group.paths(&self.poster_config, &self.choreography_config)
    }

    pub fn table(&self) -> &ActivationTable {
        &self.table
    }

    pub fn starfield(&self) -> &Starfield {
        &self.starfield
    }

    pub fn breather(&self) -> &Breather {
        &self.breather
    }

    pub fn wavefield(&self) -> &Wavefield {
        &self.wavefield
    }

    pub fn polygons(&self) -> &PolygonField {
        &self.polygons
    }

    pub fn models(&self) -> &ModelField {
        &self.models
    }

    pub fn posters(&self) -> Option<&PosterField> {
        self.posters.as_ref()
    }

    pub fn choreography(&self) -> Option<&Choreography> {
        self.choreography.as_ref()
    }

    /// Mutable handles for the renderer, which clears dirty flags on upload.
    pub fn starfield_mut(&mut self) -> &mut Starfield {
        &mut self.starfield
    }

    pub fn breather_mut(&mut self) -> &mut Breather {
        &mut self.breather
    }

    pub fn wavefield_mut(&mut self) -> &mut Wavefield {
        &mut self.wavefield
    }

    pub fn polygons_mut(&mut self) -> &mut PolygonField {
        &mut self.polygons
    }

    pub fn models_mut(&mut self) -> &mut ModelField {
        &mut self.models
    }

    pub fn posters_mut(&mut self) -> Option<&mut PosterField> {
        self.posters.as_mut()
    }

    /// Every continuously mounted field, in draw order.
    pub fn fields(&self) -> [&dyn Field; 5] {
        [
            &self.starfield,
            &self.breather,
            &self.wavefield,
            &self.polygons,
            &self.models,
        ]
    }
}
