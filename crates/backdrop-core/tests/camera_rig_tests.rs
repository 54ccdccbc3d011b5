// Host-side tests for the camera rig's interpolation law, latching and
// single-writer rule.

use backdrop_core::camera_rig::{CameraRig, Viewpoints};
use backdrop_core::choreography::CameraDirective;
use backdrop_core::state::ease_in_out_cubic;
use backdrop_core::ProjectKey;
use glam::Vec3;

fn rig() -> CameraRig {
    CameraRig::new(Viewpoints::default(), Vec3::new(0.0, 0.0, 25.0))
}

#[test]
fn transition_follows_eased_lerp() {
    let mut rig = rig();
    assert!(rig.set_key(Some(ProjectKey::YoutubeDm)));
    rig.step(0.45);

    let tr = *rig.transition().expect("transition still running");
    let from = Vec3::new(0.0, 0.0, 25.0);
    let to = Vec3::new(0.0, 0.0, 35.0);
    assert_eq!(tr.from, from);
    assert_eq!(tr.to, to);
    assert_eq!(rig.eye(), from.lerp(to, ease_in_out_cubic(tr.progress)));
    // Halfway through the cubic ease is halfway along the path.
    assert!((rig.eye().z - 30.0).abs() < 1e-3, "eye at {}", rig.eye());
}

#[test]
fn transition_latches_at_destination() {
    let mut rig = rig();
    rig.set_key(Some(ProjectKey::YoutubeDm));
    rig.step(0.5);
    rig.step(0.5);
    assert!(!rig.transitioning());
    assert_eq!(rig.eye(), Vec3::new(0.0, 0.0, 35.0));

    // Not in the auto-rotate list, so the eye holds still.
    for _ in 0..60 {
        rig.step(1.0 / 60.0);
    }
    assert_eq!(rig.eye(), Vec3::new(0.0, 0.0, 35.0));
}

#[test]
fn same_key_does_not_restart() {
    let mut rig = rig();
    assert!(rig.set_key(Some(ProjectKey::VoxNl)));
    rig.step(0.3);
    assert!(!rig.set_key(Some(ProjectKey::VoxNl)));
    assert!(rig.transition().unwrap().progress > 0.3);
}

#[test]
fn interrupted_transition_starts_from_current_eye() {
    let mut rig = rig();
    rig.set_key(Some(ProjectKey::UnlinkNl));
    rig.step(0.3);
    let mid = rig.eye();
    rig.set_key(Some(ProjectKey::MentalReset));
    let tr = rig.transition().unwrap();
    assert_eq!(tr.from, mid);
    assert_eq!(tr.to, Vec3::new(0.0, 0.0, 30.0));
    assert_eq!(tr.progress, 0.0);
}

#[test]
fn clearing_the_key_goes_home_slower() {
    let mut rig = rig();
    rig.set_key(Some(ProjectKey::MovieBot));
    rig.step(1.0);
    assert_eq!(rig.eye(), Vec3::new(0.0, 0.0, 1.0));
    rig.set_key(None);
    let tr = rig.transition().unwrap();
    assert_eq!(tr.to, Vec3::new(0.0, 0.0, 25.0));
    assert_eq!(tr.duration, 1.0);
}

#[test]
fn unmapped_key_uses_fallback_viewpoint() {
    let viewpoints = Viewpoints::empty(Vec3::new(0.0, 0.0, 35.0), Vec3::new(0.0, 0.0, 25.0))
        .with(ProjectKey::VoxNl, Vec3::new(-8.0, 6.0, 35.0));
    let mut rig = CameraRig::new(viewpoints, Vec3::new(0.0, 0.0, 25.0));
    rig.set_key(Some(ProjectKey::TrailShade));
    assert_eq!(rig.transition().unwrap().to, Vec3::new(0.0, 0.0, 35.0));
    assert_eq!(rig.transition().unwrap().duration, 0.9);
}

#[test]
fn directives_are_refused_during_transitions() {
    let mut rig = rig();
    let directive = CameraDirective {
        position: Vec3::new(5.0, 5.0, 5.0),
        position_alpha: 0.5,
        look_at: Vec3::ONE,
        look_alpha: 0.5,
    };
    rig.set_key(Some(ProjectKey::NailSalon));
    rig.step(0.1);
    let eye = rig.eye();
    assert!(!rig.apply_directive(&directive));
    assert_eq!(rig.eye(), eye);

    rig.step(1.0);
    assert!(rig.apply_directive(&directive));
    let expected = Vec3::new(0.0, 0.0, 32.0).lerp(directive.position, 0.5);
    assert!((rig.eye() - expected).length() < 1e-5);
    assert!((rig.target() - Vec3::splat(0.5)).length() < 1e-5);
}

#[test]
fn auto_rotation_only_when_idle_and_allowed() {
    let mut rig = rig();
    let controls = rig.controls();
    assert!(controls.rotate && !controls.zoom && !controls.pan);
    assert!(controls.auto_rotate);

    rig.set_key(Some(ProjectKey::UnlinkNl));
    assert!(!rig.controls().auto_rotate);
    rig.step(1.0);
    assert!(rig.controls().auto_rotate);

    // Orbiting keeps the distance to the target.
    let before = rig.eye();
    for _ in 0..600 {
        rig.step(1.0 / 60.0);
    }
    assert!((rig.eye().length() - before.length()).abs() < 1e-3);
    assert!(rig.eye() != before);

    rig.set_key(Some(ProjectKey::NailSalon));
    rig.step(1.0);
    assert!(!rig.controls().auto_rotate);
    assert!(!CameraRig::auto_rotate_allowed(Some(ProjectKey::TrailShade)));
    assert!(CameraRig::auto_rotate_allowed(Some(ProjectKey::MovieBot)));
}
