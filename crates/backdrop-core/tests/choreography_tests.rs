// Host-side tests for the nail-salon timeline, texture reselection and
// camera directives.

use backdrop_core::choreography::{
    pick_next_texture, views_along, Choreography, ChoreographyConfig, Phase, Timeline,
};
use backdrop_core::state::{damping_alpha, ease_in_out_cubic};
use backdrop_core::CoreError;
use glam::Vec3;
use rand::rngs::mock::StepRng;
use rand::{rngs::StdRng, Rng, SeedableRng};

#[test]
fn default_timeline_totals_nine_point_four_seconds() {
    let tl = Timeline::default();
    assert!((tl.total() - 9.4).abs() < 1e-5);
    assert_eq!(tl.start(Phase::Enter), 0.0);
    assert!((tl.start(Phase::Curing) - 2.4).abs() < 1e-6);
    assert!((tl.start(Phase::Idle) - 8.0).abs() < 1e-5);
}

#[test]
fn phase_at_follows_boundaries() {
    let tl = Timeline::default();
    let cases = [
        (0.0, Phase::Enter),
        (1.19, Phase::Enter),
        (1.21, Phase::EnterEnd),
        (2.39, Phase::EnterEnd),
        (2.41, Phase::Curing),
        (5.79, Phase::Curing),
        (5.81, Phase::ExitStart),
        (6.81, Phase::Exit),
        (8.01, Phase::Idle),
        (9.39, Phase::Idle),
    ];
    for (t, expected) in cases {
        assert_eq!(tl.phase_at(t), expected, "t = {t}");
    }
    for phase in Phase::ALL {
        assert_eq!(tl.phase_at(tl.start(phase)), phase);
    }
}

#[test]
fn phase_at_is_periodic() {
    let tl = Timeline::default();
    let total = tl.total();
    for phase in Phase::ALL {
        let mid = tl.start(phase) + tl.duration(phase) / 2.0;
        for k in -3..=3 {
            assert_eq!(tl.phase_at(mid + k as f32 * total), phase, "k = {k}");
        }
    }
}

#[test]
fn timeline_rejects_non_positive_durations() {
    let err = Timeline::new([1.0, 1.0, 0.0, 1.0, 1.0, 1.0]).unwrap_err();
    assert_eq!(
        err,
        CoreError::NonPositivePhase {
            phase: "curing",
            duration: 0.0
        }
    );
    assert!(Timeline::new([1.0, -2.0, 1.0, 1.0, 1.0, 1.0]).is_err());
    assert!(Timeline::new([1.0, f32::NAN, 1.0, 1.0, 1.0, 1.0]).is_err());
    let tl = Timeline::new([1.0; 6]).unwrap();
    assert_eq!(tl.phase_at(3.5), Phase::ExitStart);
}

#[test]
fn reselection_never_repeats_over_a_thousand_trials() {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    for count in [2usize, 3, 6] {
        let mut current = 0;
        for _ in 0..1000 {
            let next = pick_next_texture(&mut rng, current, count).unwrap();
            assert_ne!(next, current);
            assert!(next < count);
            current = next;
        }
    }
}

#[test]
fn reselection_gives_up_after_bounded_retries() {
    // A generator stuck on zero keeps proposing the current index.
    let mut stuck = StepRng::new(0, 0);
    assert_eq!(stuck.gen_range(0..2usize), 0);
    assert_eq!(pick_next_texture(&mut stuck, 0, 2), Some(1));
    assert_eq!(pick_next_texture(&mut stuck, 0, 6), Some(1));
}

#[test]
fn reselection_with_degenerate_sets() {
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(pick_next_texture(&mut rng, 0, 1), Some(0));
    assert_eq!(pick_next_texture(&mut rng, 0, 0), None);
}

fn run(ch: &mut Choreography, seconds: f32) {
    let frames = (seconds * 60.0).round() as usize;
    for _ in 0..frames {
        ch.step(1.0 / 60.0);
    }
}

#[test]
fn curing_commits_a_new_texture() {
    let mut ch = Choreography::new(ChoreographyConfig::default(), 42);
    assert_eq!(ch.surface().base_texture, 0);
    run(&mut ch, 2.5);
    assert_eq!(ch.phase(), Phase::Curing);
    let overlay = ch.surface().overlay_texture;
    assert_ne!(overlay, 0);

    run(&mut ch, 3.2);
    let surface = ch.surface();
    assert_eq!(surface.base_texture, overlay);
    assert_eq!(surface.overlay_opacity, 0.0);
}

#[test]
fn overlay_opacity_stays_in_range() {
    let mut ch = Choreography::new(ChoreographyConfig::default(), 7);
    for _ in 0..(60 * 20) {
        ch.step(1.0 / 60.0);
        let o = ch.surface().overlay_opacity;
        assert!((0.0..=1.0).contains(&o), "overlay at {o}");
        assert!((0.0..=0.95).contains(&ch.sparkle_opacity()));
    }
}

#[test]
fn hand_slides_in_and_back_out() {
    let mut ch = Choreography::new(ChoreographyConfig::default(), 3);
    assert!((ch.hand_z() - 4.0).abs() < 1e-6);
    run(&mut ch, 4.0);
    assert_eq!(ch.phase(), Phase::Curing);
    assert!((ch.hand_z() - 2.25).abs() < 0.05, "hand at {}", ch.hand_z());
    run(&mut ch, 5.0);
    assert_eq!(ch.phase(), Phase::Idle);
    assert!((ch.hand_z() - 4.0).abs() < 0.05, "hand at {}", ch.hand_z());
}

#[test]
fn camera_frames_the_dryer_during_curing() {
    let mut ch = Choreography::new(ChoreographyConfig::default(), 5);
    run(&mut ch, 3.0);
    let d = ch.step(1.0 / 60.0);
    assert!(ch.phase().focuses_prop());
    // Dryer sits at the root origin: (0, -1, 0) plus the (-2, 1, 3.4) offset.
    assert!((d.position - Vec3::new(-2.0, 0.0, 3.4)).length() < 1e-5);
    assert!((d.look_at - Vec3::new(0.0, -0.88, 0.0)).length() < 1e-5);
    assert!(d.position_alpha > 0.0 && d.position_alpha < 1.0);
}

#[test]
fn camera_alpha_scales_with_phase_progress() {
    let mut ch = Choreography::new(ChoreographyConfig::default(), 5);
    let first = ch.step(1.0 / 60.0);
    // First frame of `enter`: progress is ~0, so the rate is 6.5 * 0.15.
    let slow = damping_alpha(6.5 * 0.15, 1.0 / 60.0);
    let fast = damping_alpha(6.5, 1.0 / 60.0);
    assert!(first.position_alpha >= slow - 1e-4);
    assert!(first.position_alpha < fast);
    run(&mut ch, 1.15);
    let late = ch.step(1.0 / 60.0);
    assert!(late.position_alpha > first.position_alpha);
    assert!(ease_in_out_cubic(1.0) == 1.0);
}

#[test]
fn directives_stay_finite_over_a_full_loop() {
    let mut ch = Choreography::new(ChoreographyConfig::default(), 9);
    let mut saw_hand_view = false;
    for _ in 0..(60 * 10) {
        let d = ch.step(1.0 / 60.0);
        assert!(d.position.is_finite() && d.look_at.is_finite());
        assert!(d.look_alpha > 0.0 && d.look_alpha < 1.0);
        if !ch.phase().focuses_prop() {
            saw_hand_view = true;
            // Hand-relative views look past the nail, never at the dryer.
            assert!((d.position - Vec3::new(-2.0, 0.0, 3.4)).length() > 1e-3);
        }
    }
    assert!(saw_hand_view);
}

/// Nail point and hand forward axis behind a hand-view directive.
fn hand_frame(ch: &Choreography, look_at: Vec3) -> (Vec3, Vec3) {
    let nail = look_at - ch.config().view_look_at_offset;
    let forward = (ch.hand_rotation() * Vec3::Z).normalize();
    (nail, forward)
}

#[test]
fn hand_view_keeps_the_offset_framing_by_default() {
    let mut ch = Choreography::new(ChoreographyConfig::default(), 13);
    let offset = ch.config().view_camera_offset;
    let lift = Vec3::new(0.0, 0.012, 0.0);
    let mut hand_frames = 0;
    for _ in 0..(60 * 10) {
        let d = ch.step(1.0 / 60.0);
        if ch.phase().focuses_prop() {
            continue;
        }
        hand_frames += 1;
        let (nail, forward) = hand_frame(&ch, d.look_at);
        // distance = 1.2 / 0.1 * 0.92, clamped to 3.5
        let expected = nail - forward * 3.5 + lift + offset;
        assert!(
            (d.position - expected).length() < 1e-4,
            "eye {:?} expected {:?} at t = {}",
            d.position,
            expected,
            ch.loop_time()
        );
        assert!(views_along(d.position, nail, forward));
    }
    assert!(hand_frames > 0);
}

#[test]
fn hand_view_reaims_onto_the_hand_axis_when_the_offset_overshoots() {
    let config = ChoreographyConfig {
        view_camera_offset: Vec3::new(0.0, -10.0, 0.0),
        ..ChoreographyConfig::default()
    };
    let offset = config.view_camera_offset;
    let mut ch = Choreography::new(config, 13);
    let d = ch.step(1.0 / 60.0);
    assert_eq!(ch.phase(), Phase::Enter);

    let (nail, forward) = hand_frame(&ch, d.look_at);
    let lift = Vec3::new(0.0, 0.012, 0.0);
    let offset_eye = nail - forward * 3.5 + lift + offset;
    assert!(!views_along(offset_eye, nail, forward), "offset eye should trip the guard");

    let expected = nail - forward * 3.5 + lift;
    assert!((d.position - expected).length() < 1e-4, "eye {:?}", d.position);
    assert!(views_along(d.position, nail, forward));
    // Still behind the nail, looking down the hand's forward axis.
    assert!((d.position - nail).dot(forward) < 0.0);
}

#[test]
fn one_long_step_still_passes_through_curing() {
    let mut ch = Choreography::new(ChoreographyConfig::default(), 42);
    assert!((ch.config().timeline.shortest() - 1.0).abs() < 1e-6);
    ch.step(1.0 / 60.0);
    assert_eq!(ch.surface().base_texture, 0);

    // Jumps from `enter` straight into `exitStart`.
    let d = ch.step(6.0);
    assert_eq!(ch.phase(), Phase::ExitStart);
    assert!(d.position.is_finite());
    let surface = ch.surface();
    assert_ne!(surface.overlay_texture, 0, "curing never picked a texture");
    assert_eq!(surface.base_texture, surface.overlay_texture);
}

#[test]
fn non_finite_steps_leave_the_clock_alone() {
    let mut ch = Choreography::new(ChoreographyConfig::default(), 1);
    run(&mut ch, 0.5);
    let t = ch.loop_time();
    let d = ch.step(f32::INFINITY);
    assert_eq!(ch.loop_time(), t);
    assert!(d.position.is_finite());
    ch.step(f32::NAN);
    assert_eq!(ch.loop_time(), t);
}

#[test]
fn sparkle_layout_is_fixed() {
    let mut ch = Choreography::new(ChoreographyConfig::default(), 11);
    let before = ch.sparkles().to_vec();
    assert_eq!(before.len(), 80);
    run(&mut ch, 4.0);
    assert_eq!(ch.sparkles(), &before[..]);
    assert!(ch.light().intensity > 0.0);
}
