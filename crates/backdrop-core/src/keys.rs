//! Project keys and the declarative table that decides which field is live
//! for which key.

use std::fmt;

/// Projects that own a background scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectKey {
    YoutubeDm,
    UnlinkNl,
    MentalReset,
    VoxNl,
    NailSalon,
    MovieBot,
    TrailShade,
}

/// The host's current selection. `None` means no card is hovered.
pub type ActiveKey = Option<ProjectKey>;

impl ProjectKey {
    pub const ALL: [ProjectKey; 7] = [
        ProjectKey::YoutubeDm,
        ProjectKey::UnlinkNl,
        ProjectKey::MentalReset,
        ProjectKey::VoxNl,
        ProjectKey::NailSalon,
        ProjectKey::MovieBot,
        ProjectKey::TrailShade,
    ];

    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "youtube-dm" => Some(ProjectKey::YoutubeDm),
            "unlinknl" => Some(ProjectKey::UnlinkNl),
            "mental-reset" => Some(ProjectKey::MentalReset),
            "voxnl" => Some(ProjectKey::VoxNl),
            "nail-salon" => Some(ProjectKey::NailSalon),
            "moviebot" => Some(ProjectKey::MovieBot),
            "trail-shade" => Some(ProjectKey::TrailShade),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectKey::YoutubeDm => "youtube-dm",
            ProjectKey::UnlinkNl => "unlinknl",
            ProjectKey::MentalReset => "mental-reset",
            ProjectKey::VoxNl => "voxnl",
            ProjectKey::NailSalon => "nail-salon",
            ProjectKey::MovieBot => "moviebot",
            ProjectKey::TrailShade => "trail-shade",
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a host-supplied project id to an active key. Ids without a scene are
/// inactive for every field.
pub fn active_key_from_host(id: Option<&str>) -> ActiveKey {
    id.and_then(ProjectKey::parse)
}

/// Small bitset over [`ProjectKey`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeySet(u8);

impl KeySet {
    pub const EMPTY: KeySet = KeySet(0);

    pub fn of(keys: &[ProjectKey]) -> Self {
        KeySet(keys.iter().fold(0, |acc, k| acc | k.bit()))
    }

    #[inline]
    pub fn contains(self, key: ProjectKey) -> bool {
        self.0 & key.bit() != 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldId {
    Starfield,
    Breather,
    Wavefield,
    Polygons,
    Models,
    Posters,
    Choreography,
}

impl FieldId {
    pub const ALL: [FieldId; 7] = [
        FieldId::Starfield,
        FieldId::Breather,
        FieldId::Wavefield,
        FieldId::Polygons,
        FieldId::Models,
        FieldId::Posters,
        FieldId::Choreography,
    ];
}

/// How a field reacts to the active key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// Live only while one of these keys is active.
    ShowOn(KeySet),
    /// Live unless one of these keys is active; also live with no key.
    HideOn(KeySet),
}

impl Trigger {
    #[inline]
    pub fn is_live(self, key: ActiveKey) -> bool {
        match (self, key) {
            (Trigger::ShowOn(set), Some(k)) => set.contains(k),
            (Trigger::ShowOn(_), None) => false,
            (Trigger::HideOn(set), Some(k)) => !set.contains(k),
            (Trigger::HideOn(_), None) => true,
        }
    }
}

/// Every field's activation rule in one place.
#[derive(Clone, Debug)]
pub struct ActivationTable {
    triggers: [Trigger; FieldId::ALL.len()],
}

impl Default for ActivationTable {
    fn default() -> Self {
        use ProjectKey::*;
        Self {
            triggers: [
                Trigger::HideOn(KeySet::of(&[UnlinkNl, MentalReset, VoxNl, NailSalon, MovieBot])),
                Trigger::ShowOn(KeySet::of(&[MentalReset])),
                Trigger::ShowOn(KeySet::of(&[VoxNl])),
                Trigger::ShowOn(KeySet::of(&[TrailShade])),
                Trigger::ShowOn(KeySet::of(&[UnlinkNl])),
                Trigger::ShowOn(KeySet::of(&[MovieBot])),
                Trigger::ShowOn(KeySet::of(&[NailSalon])),
            ],
        }
    }
}

impl ActivationTable {
    #[inline]
    pub fn trigger(&self, field: FieldId) -> Trigger {
        self.triggers[field as usize]
    }

    pub fn with_trigger(mut self, field: FieldId, trigger: Trigger) -> Self {
        self.triggers[field as usize] = trigger;
        self
    }

    #[inline]
    pub fn is_live(&self, field: FieldId, key: ActiveKey) -> bool {
        self.trigger(field).is_live(key)
    }
}
