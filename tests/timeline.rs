//! Morph Timeline Tests
//!
//! Phase order, progress monotonicity, target advancement and index wrap.
//!
//! # Running tests
//! ```bash
//! cargo test --test timeline
//! ```

use morphfield::error::MorphError;
use morphfield::timeline::{Easing, MorphPhase, MorphTimeline, TimelineEvent, TimelineSettings};

fn settings(easing: Easing) -> TimelineSettings {
    TimelineSettings {
        wait_secs: 1.0,
        morph_secs: 1.0,
        easing,
    }
}

/// Tick in small steps until the phase changes, returning progress samples
/// taken while still inside `phase`.
fn sample_phase(timeline: &mut MorphTimeline, phase: MorphPhase, dt: f32) -> Vec<f32> {
    let mut samples = Vec::new();
    for _ in 0..10_000 {
        if timeline.phase() != phase {
            break;
        }
        samples.push(timeline.progress());
        timeline.tick(dt);
    }
    samples
}

#[test]
fn test_starts_waiting_with_first_two_shapes() {
    let timeline = MorphTimeline::new(4, settings(Easing::Linear)).unwrap();
    assert_eq!(timeline.phase(), MorphPhase::WaitingToForward);
    assert_eq!(timeline.progress(), 0.0);
    assert_eq!(timeline.targets(), (0, 1));
    assert_eq!(timeline.cursor(), 1);
}

#[test]
fn test_phases_follow_fixed_order() {
    let mut timeline = MorphTimeline::new(3, settings(Easing::Linear)).unwrap();
    let expected = [
        MorphPhase::MorphingForward,
        MorphPhase::WaitingToBackward,
        MorphPhase::MorphingBackward,
        MorphPhase::WaitingToForward,
        MorphPhase::MorphingForward,
    ];
    for phase in expected {
        timeline.tick(1.0);
        assert_eq!(timeline.phase(), phase);
    }
}

#[test]
fn test_forward_morph_is_monotonic_and_ends_at_one() {
    for easing in [Easing::Linear, Easing::QuadOut] {
        let mut timeline = MorphTimeline::new(4, settings(easing)).unwrap();
        timeline.tick(1.0);
        assert_eq!(timeline.phase(), MorphPhase::MorphingForward);

        let samples = sample_phase(&mut timeline, MorphPhase::MorphingForward, 0.013);
        assert!(samples.len() > 10);
        for pair in samples.windows(2) {
            assert!(pair[1] >= pair[0], "{:?}: {} then {}", easing, pair[0], pair[1]);
        }
        assert_eq!(timeline.phase(), MorphPhase::WaitingToBackward);
        assert_eq!(timeline.progress(), 1.0);
    }
}

#[test]
fn test_backward_morph_is_monotonic_and_ends_at_zero() {
    for easing in [Easing::Linear, Easing::QuadOut] {
        let mut timeline = MorphTimeline::new(4, settings(easing)).unwrap();
        timeline.tick(3.0);
        assert_eq!(timeline.phase(), MorphPhase::MorphingBackward);
        assert_eq!(timeline.progress(), 1.0);

        let samples = sample_phase(&mut timeline, MorphPhase::MorphingBackward, 0.017);
        for pair in samples.windows(2) {
            assert!(pair[1] <= pair[0], "{:?}: {} then {}", easing, pair[0], pair[1]);
        }
        assert_eq!(timeline.phase(), MorphPhase::WaitingToForward);
        assert_eq!(timeline.progress(), 0.0);
    }
}

#[test]
fn test_progress_holds_during_waits() {
    let mut timeline = MorphTimeline::new(2, settings(Easing::Linear)).unwrap();
    timeline.tick(0.5);
    assert_eq!(timeline.progress(), 0.0);
    timeline.tick(2.0); // into WaitingToBackward
    assert_eq!(timeline.phase(), MorphPhase::WaitingToBackward);
    timeline.tick(0.25);
    assert_eq!(timeline.progress(), 1.0);
}

#[test]
fn test_linear_progress_midway() {
    let mut timeline = MorphTimeline::new(2, settings(Easing::Linear)).unwrap();
    timeline.tick(1.5);
    assert!((timeline.progress() - 0.5).abs() < 1e-6);
}

#[test]
fn test_full_cycle_events() {
    let mut timeline = MorphTimeline::new(4, settings(Easing::QuadOut)).unwrap();
    let events = timeline.tick(4.0);
    assert_eq!(
        events,
        vec![
            TimelineEvent::ForwardComplete { target1: 1 },
            TimelineEvent::BackwardComplete { target2: 2 },
            TimelineEvent::CycleComplete { cursor: 2 },
        ]
    );
    assert_eq!(timeline.targets(), (1, 2));
    assert_eq!(timeline.cycles(), 1);
}

#[test]
fn test_targets_wrap_modulo_shape_count() {
    let mut timeline = MorphTimeline::new(4, settings(Easing::Linear)).unwrap();
    let mut seen = Vec::new();
    for _ in 0..5 {
        timeline.tick(4.0);
        seen.push(timeline.targets());
    }
    assert_eq!(seen, vec![(1, 2), (2, 3), (3, 0), (0, 1), (1, 2)]);
}

#[test]
fn test_every_morph_moves_to_the_next_shape() {
    // Seen by the viewer: each forward morph blends target1 -> target2
    let mut timeline = MorphTimeline::new(3, settings(Easing::Linear)).unwrap();
    let mut shown = Vec::new();
    for _ in 0..6 {
        timeline.tick(1.0); // end of wait, forward morph begins
        shown.push(timeline.targets());
        timeline.tick(3.0);
    }
    assert_eq!(shown, vec![(0, 1), (1, 2), (2, 0), (0, 1), (1, 2), (2, 0)]);
}

#[test]
fn test_single_shape_always_targets_itself() {
    let mut timeline = MorphTimeline::new(1, settings(Easing::Linear)).unwrap();
    assert_eq!(timeline.targets(), (0, 0));
    for _ in 0..3 {
        timeline.tick(4.0);
        assert_eq!(timeline.targets(), (0, 0));
        assert_eq!(timeline.cursor(), 0);
    }
}

#[test]
fn test_large_delta_crosses_many_phases() {
    let mut stepped = MorphTimeline::new(4, settings(Easing::Linear)).unwrap();
    for _ in 0..41 {
        stepped.tick(0.25);
    }
    let mut jumped = MorphTimeline::new(4, settings(Easing::Linear)).unwrap();
    jumped.tick(10.25);

    assert_eq!(stepped.phase(), jumped.phase());
    assert_eq!(stepped.targets(), jumped.targets());
    assert_eq!(stepped.cycles(), jumped.cycles());
    assert!((stepped.progress() - jumped.progress()).abs() < 1e-4);
}

#[test]
fn test_zero_wait_goes_straight_to_morph() {
    let mut timeline = MorphTimeline::new(
        2,
        TimelineSettings {
            wait_secs: 0.0,
            morph_secs: 1.0,
            easing: Easing::Linear,
        },
    )
    .unwrap();
    timeline.tick(0.0);
    assert_eq!(timeline.phase(), MorphPhase::MorphingForward);
    timeline.tick(0.25);
    assert!((timeline.progress() - 0.25).abs() < 1e-6);
}

#[test]
fn test_negative_and_nan_deltas_are_ignored() {
    let mut timeline = MorphTimeline::new(2, settings(Easing::Linear)).unwrap();
    timeline.tick(1.5);
    let before = timeline.progress();
    timeline.tick(-3.0);
    timeline.tick(f32::NAN);
    assert_eq!(timeline.progress(), before);
    assert_eq!(timeline.phase(), MorphPhase::MorphingForward);
}

#[test]
fn test_pause_freezes_and_override_scrubs() {
    let mut timeline = MorphTimeline::new(2, settings(Easing::Linear)).unwrap();
    timeline.tick(1.5);

    // Ignored while running
    timeline.override_progress(0.9);
    assert!((timeline.progress() - 0.5).abs() < 1e-6);

    timeline.pause();
    assert!(timeline.tick(10.0).is_empty());
    assert_eq!(timeline.phase(), MorphPhase::MorphingForward);

    timeline.override_progress(0.8);
    assert_eq!(timeline.progress(), 0.8);
    timeline.override_progress(7.0);
    assert_eq!(timeline.progress(), 1.0);

    timeline.resume();
    timeline.tick(0.25);
    assert!((timeline.progress() - 0.75).abs() < 1e-6);
}

#[test]
fn test_resume_during_wait_restores_rest_progress() {
    let mut timeline = MorphTimeline::new(3, settings(Easing::Linear)).unwrap();
    timeline.tick(0.25);
    timeline.pause();
    timeline.override_progress(0.7);
    assert_eq!(timeline.progress(), 0.7);

    timeline.resume();
    assert_eq!(timeline.progress(), 0.0);
    timeline.tick(0.25);
    assert_eq!(timeline.phase(), MorphPhase::WaitingToForward);
    assert_eq!(timeline.progress(), 0.0);

    // Same after the forward morph, where the wait rests at 1
    timeline.tick(2.0);
    assert_eq!(timeline.phase(), MorphPhase::WaitingToBackward);
    timeline.pause();
    timeline.override_progress(0.2);
    timeline.resume();
    assert_eq!(timeline.progress(), 1.0);
}

#[test]
fn test_resume_mid_morph_recomputes_from_schedule() {
    let mut timeline = MorphTimeline::new(2, settings(Easing::Linear)).unwrap();
    timeline.tick(1.25);
    timeline.pause();
    timeline.override_progress(0.9);
    timeline.resume();
    assert!((timeline.progress() - 0.25).abs() < 1e-6);
}

#[test]
fn test_default_settings_use_half_second_morphs() {
    let defaults = TimelineSettings::default();
    assert_eq!(defaults.wait_secs, 1.0);
    assert_eq!(defaults.morph_secs, 0.5);
    assert_eq!(defaults.easing, Easing::QuadOut);
}

#[test]
fn test_rejects_empty_shape_set_and_bad_durations() {
    assert!(matches!(
        MorphTimeline::new(0, settings(Easing::Linear)),
        Err(MorphError::NoShapes)
    ));
    let zero_morph = TimelineSettings {
        wait_secs: 1.0,
        morph_secs: 0.0,
        easing: Easing::Linear,
    };
    assert!(matches!(
        MorphTimeline::new(2, zero_morph),
        Err(MorphError::InvalidConfig(_))
    ));
}

#[test]
fn test_easing_endpoints() {
    for easing in [Easing::Linear, Easing::QuadOut] {
        assert_eq!(easing.apply(0.0), 0.0);
        assert_eq!(easing.apply(1.0), 1.0);
        assert_eq!(easing.apply(2.0), 1.0);
    }
    assert!((Easing::QuadOut.apply(0.5) - 0.75).abs() < 1e-6);
}
