// Host-side tests for compositor mounting rules and the poster ramp.

use backdrop_core::poster::ActivationRamp;
use backdrop_core::*;
use glam::Vec3;

const DT: f32 = 1.0 / 60.0;

struct Harness {
    clock: FrameClock,
    compositor: Compositor,
}

impl Harness {
    fn new() -> Self {
        Self {
            clock: FrameClock::default(),
            compositor: Compositor::new(ActivationTable::default(), 17),
        }
    }

    fn frame(&mut self, key: ActiveKey) -> Option<CameraDirective> {
        self.clock.advance(DT);
        self.compositor
            .step(&self.clock, key, Vec3::new(0.0, 0.0, 25.0))
    }

    fn frames(&mut self, key: ActiveKey, n: usize) {
        for _ in 0..n {
            self.frame(key);
        }
    }
}

#[test]
fn choreography_mounts_only_for_its_key() {
    let mut h = Harness::new();
    assert!(h.frame(None).is_none());
    assert!(h.compositor.choreography().is_none());

    let directive = h.frame(Some(ProjectKey::NailSalon));
    assert!(directive.is_some());
    assert!(h.compositor.choreography().is_some());

    // Leaving unmounts immediately and drops the loop clock with it.
    assert!(h.frame(Some(ProjectKey::VoxNl)).is_none());
    assert!(h.compositor.choreography().is_none());

    h.frame(Some(ProjectKey::NailSalon));
    let ch = h.compositor.choreography().unwrap();
    assert!(ch.loop_time() < 2.0 * DT);
}

#[test]
fn posters_linger_after_their_key_leaves() {
    let mut h = Harness::new();
    h.frames(Some(ProjectKey::MovieBot), 30);
    assert!(h.compositor.posters().is_some());

    h.frame(None);
    let left_at = h.clock.elapsed;
    let mut unmounted_at = None;
    for _ in 0..120 {
        h.frame(None);
        if h.compositor.posters().is_none() {
            unmounted_at = Some(h.clock.elapsed);
            break;
        }
    }
    let unmounted_at = unmounted_at.expect("posters never unmounted");
    let linger = unmounted_at - left_at;
    assert!(linger >= 0.6 - 1e-9, "unmounted after {linger}s");
    assert!(linger < 0.6 + 2.0 * DT as f64, "unmounted after {linger}s");
}

#[test]
fn returning_key_cancels_poster_unmount() {
    let mut h = Harness::new();
    h.frames(Some(ProjectKey::MovieBot), 10);
    h.frames(None, 20);
    assert!(h.compositor.posters().is_some());
    h.frames(Some(ProjectKey::MovieBot), 5);
    h.frames(None, 30);
    assert!(h.compositor.posters().is_some());
    h.frames(None, 10);
    assert!(h.compositor.posters().is_none());
}

#[test]
fn posters_fade_out_while_lingering() {
    let mut h = Harness::new();
    h.frames(Some(ProjectKey::MovieBot), 60);
    let lit = h.compositor.posters().unwrap().activation().current();
    h.frames(None, 20);
    let fading = h.compositor.posters().unwrap().activation().current();
    assert!(fading < lit);
}

#[test]
fn starfield_hides_behind_scene_fields() {
    let mut h = Harness::new();
    h.frames(Some(ProjectKey::YoutubeDm), 30);
    assert!(h.compositor.starfield().visible());
    h.frames(Some(ProjectKey::MentalReset), 240);
    assert!(!h.compositor.starfield().visible());
    assert!(h.compositor.breather().visible());
    let visible: Vec<_> = h
        .compositor
        .fields()
        .iter()
        .filter(|f| f.visible())
        .map(|f| f.id())
        .collect();
    assert_eq!(visible, vec![FieldId::Breather]);
}

#[test]
fn asset_groups_follow_mounts() {
    let mut h = Harness::new();
    h.frame(None);
    assert_eq!(h.compositor.mounted_asset_groups().as_slice(), &[AssetGroup::Models]);

    h.frame(Some(ProjectKey::NailSalon));
    assert_eq!(
        h.compositor.mounted_asset_groups().as_slice(),
        &[AssetGroup::Models, AssetGroup::NailSalon]
    );
    let paths = h.compositor.asset_paths(AssetGroup::NailSalon);
    assert_eq!(paths.len(), 8);
    assert!(paths.iter().any(|p| p.ends_with("hand.glb")));

    h.frame(Some(ProjectKey::MovieBot));
    assert_eq!(
        h.compositor.mounted_asset_groups().as_slice(),
        &[AssetGroup::Models, AssetGroup::Posters]
    );
    assert_eq!(h.compositor.asset_paths(AssetGroup::Posters).len(), 62);
    assert_eq!(h.compositor.asset_paths(AssetGroup::Models).len(), 6);
}

#[test]
fn poster_ramp_starts_small_and_fills_up() {
    let mut ramp = ActivationRamp::new(124, 0.12);
    assert_eq!(ramp.live(), 24);
    ramp.tick(0.0);
    assert_eq!(ramp.live(), 24);
    ramp.tick(0.1);
    assert_eq!(ramp.live(), 24);
    ramp.tick(0.12);
    assert_eq!(ramp.live(), 39);

    let mut now = 0.12;
    while !ramp.complete() {
        now += 0.12;
        ramp.tick(now);
    }
    assert_eq!(ramp.live(), 124);
    ramp.promote();
    assert_eq!(ramp.live(), 124);

    // Small sets start fully live.
    assert_eq!(ActivationRamp::new(8, 0.12).live(), 8);
    assert_eq!(ActivationRamp::new(1000, 0.12).live(), 120);
}

#[test]
fn poster_field_grows_live_prefix_over_time() {
    let mut h = Harness::new();
    h.frame(Some(ProjectKey::MovieBot));
    let posters = h.compositor.posters().unwrap();
    assert_eq!(posters.len(), 124);
    assert_eq!(posters.live_transforms().len(), 24);

    h.frames(Some(ProjectKey::MovieBot), 120);
    let posters = h.compositor.posters().unwrap();
    assert_eq!(posters.live_transforms().len(), 124);
    assert_eq!(posters.live_textures().len(), 124);

    h.compositor.posters_mut().unwrap().promote_batch();
    assert_eq!(h.compositor.posters().unwrap().ramp().live(), 124);
}

#[test]
fn posters_face_the_camera() {
    let eye = Vec3::new(3.0, -2.0, 20.0);
    let from = Vec3::new(1.0, 4.0, -5.0);
    let q = backdrop_core::poster::facing(from, eye);
    let forward = q * Vec3::Z;
    assert!((forward - (eye - from).normalize()).length() < 1e-4);
    assert_eq!(backdrop_core::poster::facing(eye, eye), glam::Quat::IDENTITY);
}
