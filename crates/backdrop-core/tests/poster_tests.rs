// Host-side tests for poster billboarding and the poster spring.

use backdrop_core::poster::PosterField;
use backdrop_core::{Billboard, Field, FrameClock, FrameInput, KeySet, ProjectKey, Trigger};
use glam::Vec3;

const DT: f32 = 1.0 / 60.0;

fn posters() -> PosterField {
    PosterField::new(Trigger::ShowOn(KeySet::of(&[ProjectKey::MovieBot])), 23)
}

fn step(field: &mut PosterField, clock: &mut FrameClock, eye: Vec3) {
    clock.advance(DT);
    field.step(&FrameInput::new(clock, Some(ProjectKey::MovieBot), eye));
}

fn assert_facing(field: &PosterField, eye: Vec3) {
    for (i, m) in field.live_transforms().iter().enumerate() {
        let (_, rotation, pos) = m.to_scale_rotation_translation();
        let normal = rotation * Vec3::Z;
        let to_eye = (eye - pos).normalize();
        assert!(
            normal.dot(to_eye) > 0.9999,
            "poster {i} faces {normal:?}, eye is along {to_eye:?}"
        );
    }
}

#[test]
fn live_posters_turn_to_follow_the_eye() {
    let mut field = posters();
    let mut clock = FrameClock::default();
    let eye_a = Vec3::new(0.0, 0.0, 25.0);
    let eye_b = Vec3::new(18.0, 6.0, -12.0);

    for _ in 0..5 {
        step(&mut field, &mut clock, eye_a);
    }
    assert!(!field.live_transforms().is_empty());
    assert_facing(&field, eye_a);

    step(&mut field, &mut clock, eye_b);
    assert_facing(&field, eye_b);

    // A far eye gives a clearly different heading for at least one card.
    let (_, r, p) = field.live_transforms()[0].to_scale_rotation_translation();
    assert!((r * Vec3::Z).dot((eye_a - p).normalize()) < 0.99);
}

#[test]
fn roll_stays_a_small_wobble() {
    let mut field = posters();
    let mut clock = FrameClock::default();
    let eye = Vec3::new(0.0, 0.0, 25.0);
    for _ in 0..120 {
        step(&mut field, &mut clock, eye);
        for m in field.live_transforms() {
            let (scale, rotation, pos) = m.to_scale_rotation_translation();
            // With world up in view the card's x axis stays level within the roll.
            let z = (eye - pos).normalize();
            if z.y.abs() > 0.9 {
                continue;
            }
            let level = Vec3::Y.cross(z).normalize();
            let x = rotation * Vec3::X;
            assert!(x.dot(level) > 0.999, "card rolled to {x:?}");
            assert!(scale.x > 0.0 && scale.x <= 1.6 * 1.1 + 1e-4);
        }
    }
}

#[test]
fn spring_keeps_posters_near_their_drifting_home() {
    let mut field = posters();
    let mut clock = FrameClock::default();
    let eye = Vec3::new(0.0, 0.0, 25.0);
    for frame in 0..(60 * 20) {
        step(&mut field, &mut clock, eye);
        let t = clock.elapsed as f32;
        let live = field.live_transforms().len();
        for (i, p) in field.positions()[..live].iter().enumerate() {
            let gap = (*p - field.target(i, t)).length();
            assert!(gap.is_finite() && gap < 3.5, "poster {i} drifted {gap} at frame {frame}");
            if t > 12.0 {
                assert!(gap < 0.25, "poster {i} still {gap} away after settling");
            }
        }
    }
}

#[test]
fn billboards_keep_the_poster_orientation() {
    let mut field = posters();
    let mut clock = FrameClock::default();
    let eye = Vec3::new(-9.0, 4.0, 22.0);
    for _ in 0..30 {
        step(&mut field, &mut clock, eye);
    }
    for m in field.live_transforms() {
        let (scale, rotation, pos) = m.to_scale_rotation_translation();
        let b = Billboard::from_transform(m);
        assert!((b.center - pos).length() < 1e-4);
        assert!((b.size - scale.x).abs() < 1e-4);
        assert!((b.right - rotation * Vec3::X).length() < 1e-4);
        assert!((b.up - rotation * Vec3::Y).length() < 1e-4);
        assert!(b.normal().dot((eye - pos).normalize()) > 0.9999);
    }
}
