//! End-to-end runs of the monitor loop with a scripted detector.

use std::sync::{Arc, Mutex};

use propwatch::{
    BBox, CanvasSize, DrawOp, Prediction, SceneMonitor, ScriptedDetector, ScriptedFrame, Settings,
    TickOutcome, Transition, VideoSize,
};

fn cup(score: f32) -> ScriptedFrame {
    ScriptedFrame::Predictions(vec![Prediction::new(
        "cup",
        score,
        BBox::new(100.0, 80.0, 120.0, 160.0),
    )])
}

fn book(score: f32) -> ScriptedFrame {
    ScriptedFrame::Predictions(vec![Prediction::new(
        "book",
        score,
        BBox::new(200.0, 120.0, 90.0, 140.0),
    )])
}

fn empty() -> ScriptedFrame {
    ScriptedFrame::Empty
}

fn monitor_with(
    frames: Vec<ScriptedFrame>,
    transitions: &Arc<Mutex<Vec<bool>>>,
) -> SceneMonitor<ScriptedDetector> {
    let log = Arc::clone(transitions);
    let mut monitor = SceneMonitor::new(ScriptedDetector::new(frames), Settings::default())
        .with_state_sink(move |performative: bool| {
            log.lock().unwrap().push(performative);
        });
    monitor.start();
    monitor
}

fn run(monitor: &mut SceneMonitor<ScriptedDetector>, ticks: usize) -> Vec<TickOutcome> {
    (0..ticks).map(|_| monitor.tick(&[], 640, 480)).collect()
}

fn transition_of(outcome: &TickOutcome) -> Option<Transition> {
    match outcome {
        TickOutcome::Frame(report) => report.transition,
        _ => None,
    }
}

#[test]
fn enters_only_after_full_match_run() {
    let transitions = Arc::new(Mutex::new(Vec::new()));
    let mut monitor = monitor_with(vec![cup(0.5), cup(0.5), cup(0.5), cup(0.5)], &transitions);

    let outcomes = run(&mut monitor, 4);

    assert_eq!(transition_of(&outcomes[0]), None);
    assert_eq!(transition_of(&outcomes[1]), None);
    assert_eq!(transition_of(&outcomes[2]), None);
    assert_eq!(transition_of(&outcomes[3]), Some(Transition::Entered));
    assert!(monitor.state().is_performative());
    assert_eq!(*transitions.lock().unwrap(), vec![true]);
}

#[test]
fn exit_run_is_interrupted_by_a_single_passing_frame() {
    let transitions = Arc::new(Mutex::new(Vec::new()));
    let mut frames = vec![cup(0.5); 4];
    frames.extend(vec![empty(); 5]);
    // Book at 0.45 clears both the exit threshold and the book minimum,
    // so it restarts the exit countdown.
    frames.push(book(0.45));
    frames.extend(vec![empty(); 6]);
    let mut monitor = monitor_with(frames, &transitions);

    let outcomes = run(&mut monitor, 16);

    let flips: Vec<_> = outcomes.iter().filter_map(transition_of).collect();
    assert_eq!(flips, vec![Transition::Entered, Transition::Exited]);
    assert_eq!(transition_of(&outcomes[15]), Some(Transition::Exited));
    assert!(!monitor.state().is_performative());
    assert_eq!(*transitions.lock().unwrap(), vec![true, false]);
}

#[test]
fn low_scoring_book_does_not_interrupt_exit() {
    let transitions = Arc::new(Mutex::new(Vec::new()));
    let mut frames = vec![cup(0.5); 4];
    frames.extend(vec![empty(); 3]);
    // 0.35 clears the exit threshold but not the book minimum of 0.40.
    frames.push(book(0.35));
    frames.extend(vec![empty(); 2]);
    let mut monitor = monitor_with(frames, &transitions);

    let outcomes = run(&mut monitor, 10);

    assert_eq!(transition_of(&outcomes[9]), Some(Transition::Exited));
    assert_eq!(*transitions.lock().unwrap(), vec![true, false]);
}

#[test]
fn raising_frames_enter_restarts_the_run() {
    let transitions = Arc::new(Mutex::new(Vec::new()));
    let mut monitor = monitor_with(vec![cup(0.5); 5], &transitions);

    run(&mut monitor, 3);
    assert_eq!(monitor.state().match_streak(), 3);

    // Frames counted under the old threshold must not count toward the
    // new one, so the partial streak is dropped.
    monitor.set_frames_enter(2);
    assert_eq!(monitor.state().match_streak(), 0);

    let outcomes = run(&mut monitor, 2);
    assert_eq!(transition_of(&outcomes[0]), None);
    assert_eq!(transition_of(&outcomes[1]), Some(Transition::Entered));
}

#[test]
fn detector_failure_holds_both_streaks() {
    let transitions = Arc::new(Mutex::new(Vec::new()));
    let mut monitor = monitor_with(
        vec![cup(0.5), cup(0.5), ScriptedFrame::Fail, cup(0.5), cup(0.5)],
        &transitions,
    );

    run(&mut monitor, 2);
    assert_eq!(monitor.state().match_streak(), 2);

    let outcome = monitor.tick(&[], 640, 480);
    assert!(matches!(outcome, TickOutcome::DetectorFailed));
    assert_eq!(monitor.state().match_streak(), 2);

    let outcomes = run(&mut monitor, 2);
    assert_eq!(transition_of(&outcomes[1]), Some(Transition::Entered));
}

#[test]
fn stop_resets_state_and_restart_begins_fresh() {
    let transitions = Arc::new(Mutex::new(Vec::new()));
    let mut monitor = monitor_with(vec![cup(0.5); 8], &transitions);

    run(&mut monitor, 4);
    assert!(monitor.state().is_performative());

    monitor.stop();
    assert!(!monitor.state().is_performative());
    assert!(matches!(monitor.tick(&[], 640, 480), TickOutcome::Idle));

    monitor.start();
    let outcomes = run(&mut monitor, 4);
    assert_eq!(transition_of(&outcomes[3]), Some(Transition::Entered));
}

#[test]
fn overlay_disabled_still_advances_the_state_machine() {
    let mut monitor =
        SceneMonitor::new(ScriptedDetector::new(vec![cup(0.5); 4]), Settings::default())
            .with_overlay(false);
    monitor.start();

    for _ in 0..3 {
        let TickOutcome::Frame(report) = monitor.tick(&[], 640, 480) else {
            panic!("expected a processed frame");
        };
        assert_eq!(report.overlay, vec![DrawOp::Clear]);
    }
    let TickOutcome::Frame(report) = monitor.tick(&[], 640, 480) else {
        panic!("expected a processed frame");
    };
    assert_eq!(report.transition, Some(Transition::Entered));
    assert_eq!(report.overlay, vec![DrawOp::Clear]);
}

#[test]
fn overlay_enabled_draws_passing_predictions() {
    let mut monitor =
        SceneMonitor::new(ScriptedDetector::new(vec![cup(0.5)]), Settings::default())
            .with_overlay(true);
    monitor.set_surface(
        VideoSize::new(640.0, 480.0),
        CanvasSize::from_css(640.0, 480.0, 1.0),
    );
    monitor.start();

    let TickOutcome::Frame(report) = monitor.tick(&[], 640, 480) else {
        panic!("expected a processed frame");
    };
    assert_eq!(report.pass_count, 1);
    assert_eq!(report.overlay[0], DrawOp::Clear);
    assert!(report.overlay.len() > 1);
    assert!(report
        .overlay
        .iter()
        .any(|op| matches!(op, DrawOp::StrokeRect { .. })));
}

#[test]
fn non_finite_bbox_counts_for_state_but_is_not_drawn() {
    let frame = ScriptedFrame::Predictions(vec![Prediction::new(
        "cup",
        0.5,
        BBox::new(f32::NAN, 80.0, 120.0, 160.0),
    )]);
    let mut monitor =
        SceneMonitor::new(ScriptedDetector::new(vec![frame]), Settings::default())
            .with_overlay(true);
    monitor.set_surface(
        VideoSize::new(640.0, 480.0),
        CanvasSize::from_css(640.0, 480.0, 1.0),
    );
    monitor.start();

    let TickOutcome::Frame(report) = monitor.tick(&[], 640, 480) else {
        panic!("expected a processed frame");
    };
    assert_eq!(report.pass_count, 1);
    assert_eq!(monitor.state().match_streak(), 1);
    assert_eq!(report.overlay, vec![DrawOp::Clear]);
}

#[test]
fn visibility_pause_preserves_progress() {
    let transitions = Arc::new(Mutex::new(Vec::new()));
    let mut monitor = monitor_with(vec![cup(0.5); 4], &transitions);

    run(&mut monitor, 3);
    monitor.set_visible(false);
    for _ in 0..10 {
        assert!(matches!(monitor.tick(&[], 640, 480), TickOutcome::Idle));
    }
    monitor.set_visible(true);

    let outcome = monitor.tick(&[], 640, 480);
    assert_eq!(transition_of(&outcome), Some(Transition::Entered));
}
