//! End-to-end tests: synthetic hand poses through the classifier, the
//! controller and the frame loop into a recording sink.

mod common;

use std::io::Cursor;
use std::sync::atomic::AtomicBool;

use common::{Call, Pose, Recorder, Scripted, Shape};
use virtual_touch::controller::DragMode;
use virtual_touch::stats::Stage;
use virtual_touch::{
    Action, Config, ControlLoop, GestureController, GestureVerdict, JsonLinesSource,
    LandmarkProvider, LoopSummary, MouseButton, Observation, Phase, Point,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn run_loop<P: LandmarkProvider>(config: &Config, provider: P, sink: Recorder) -> (LoopSummary, Recorder) {
    let controller = GestureController::new(config, sink).expect("valid config");
    let mut control = ControlLoop::new(provider, controller);
    let summary = control.run(&AtomicBool::new(false)).expect("loop runs");
    let (_, controller) = control.into_parts();
    (summary, controller.into_sink())
}

fn controller(config: &Config) -> GestureController<Recorder> {
    GestureController::new(config, Recorder::default()).expect("valid config")
}

fn target_of(pose: &Pose) -> Point {
    Config::default().mapper().map(pose.index_tip())
}

fn is_click(call: &Call) -> bool {
    matches!(call, Call::Click(_) | Call::DoubleClick)
}

// ============================================================================
// Classification through real landmark geometry
// ============================================================================

#[test]
fn test_pose_verdicts() {
    let cases = [
        (Pose::from_bits([0, 1, 0, 0, 0]), GestureVerdict::Move),
        (Pose::from_bits([1, 0, 0, 0, 0]), GestureVerdict::LeftClick),
        (Pose::from_bits([1, 1, 0, 0, 1]), GestureVerdict::RightClick),
        (Pose::from_bits([0, 1, 1, 1, 1]), GestureVerdict::Drag),
        (Pose::from_bits([0, 0, 0, 0, 0]), GestureVerdict::ScrollDown),
        (Pose::from_bits([0, 0, 0, 0, 1]), GestureVerdict::ScrollUp),
        (Pose::from_bits([1, 1, 1, 1, 1]), GestureVerdict::None),
        (Pose::from_bits([0, 1, 1, 0, 0]), GestureVerdict::None),
    ];

    for (pose, expected) in cases {
        let mut ctl = controller(&Config::default());
        let outcome = ctl.process_frame(Some(&pose.frame())).unwrap();
        assert_eq!(outcome.verdict, expected, "{:?}", outcome.fingers);
    }
}

#[test]
fn test_geometric_rules_take_priority() {
    let cases = [
        // Pinch with an extended index moves, even in the drag posture
        (Pose::from_bits([0, 1, 1, 1, 1]).pinched(), GestureVerdict::Move),
        // Curled index, raised middle
        (Pose::from_bits([0, 0, 1, 0, 0]).index(Shape::Curled), GestureVerdict::LeftClick),
        // Curled middle under the index-only posture
        (Pose::from_bits([0, 1, 0, 0, 0]).middle(Shape::Curled), GestureVerdict::RightClick),
        (
            Pose::from_bits([0, 0, 0, 0, 0]).index(Shape::Curled).middle(Shape::Curled),
            GestureVerdict::DoubleClick,
        ),
        (
            Pose::from_bits([0, 0, 0, 0, 0])
                .index(Shape::Curled)
                .middle(Shape::Curled)
                .pinched(),
            GestureVerdict::Screenshot,
        ),
    ];

    for (pose, expected) in cases {
        let mut ctl = controller(&Config::default());
        let outcome = ctl.process_frame(Some(&pose.frame())).unwrap();
        assert_eq!(outcome.verdict, expected, "{:?}", outcome.fingers);
    }
}

// ============================================================================
// Cursor movement
// ============================================================================

#[test]
fn test_index_only_converges_without_clicking() {
    let pose = Pose::from_bits([0, 1, 0, 0, 0]);
    let target = target_of(&pose);
    let mut ctl = controller(&Config::default());

    let mut gap = f64::INFINITY;
    for frame in 0..15 {
        let outcome = ctl.process_frame(Some(&pose.frame())).unwrap();
        assert_eq!(outcome.verdict, GestureVerdict::Move, "frame {frame}");

        let next_gap = ctl.cursor_state().prev.distance_to(target);
        assert!(next_gap < gap, "frame {frame}: {next_gap} >= {gap}");
        gap = next_gap;
    }

    // 0.8^15 of the starting distance is left
    let start = Point::default().distance_to(target);
    assert!(gap < 0.05 * start);
    assert_eq!(ctl.phase(), Phase::Moving);

    let sink = ctl.into_sink();
    assert_eq!(sink.moves().len(), 15);
    assert_eq!(sink.count(is_click), 0);
}

#[test]
fn test_mirrored_output() {
    let pose = Pose::from_bits([0, 1, 0, 0, 0]);
    let target = target_of(&pose);

    let mut config = Config::default();
    config.camera.mirror_x = true;
    let mut ctl = controller(&config);
    let outcome = ctl.process_frame(Some(&pose.frame())).unwrap();

    let Action::Move { x, y } = outcome.action else {
        panic!("expected a move, got {:?}", outcome.action);
    };
    assert!((x - (1920.0 - 0.2 * target.x)).abs() < 1e-9);
    assert!((y - 0.2 * target.y).abs() < 1e-9);
}

#[test]
fn test_missing_hand_changes_nothing() {
    let pose = Pose::from_bits([0, 1, 0, 0, 0]);
    let mut ctl = controller(&Config::default());
    for _ in 0..3 {
        ctl.process_frame(Some(&pose.frame())).unwrap();
    }
    let before = ctl.cursor_state();

    for _ in 0..5 {
        let outcome = ctl.process_frame(None).unwrap();
        assert_eq!(outcome.verdict, GestureVerdict::None);
        assert_eq!(outcome.action, Action::None);
    }

    assert_eq!(ctl.cursor_state(), before);
    assert_eq!(ctl.into_sink().calls.len(), 3);
}

// ============================================================================
// Debounced clicks
// ============================================================================

#[test]
fn test_sustained_thumb_clicks_once_per_full_buffer() {
    let pose = Pose::from_bits([1, 0, 0, 0, 0]);
    let mut ctl = controller(&Config::default());

    let mut fired_at = Vec::new();
    for frame in 0..25 {
        let outcome = ctl.process_frame(Some(&pose.frame())).unwrap();
        assert_eq!(outcome.verdict, GestureVerdict::LeftClick);
        if outcome.action == Action::Click(MouseButton::Left) {
            fired_at.push(frame);
        }
    }

    assert_eq!(fired_at, vec![9, 19]);
    assert_eq!(ctl.pending_samples(), 5);

    let sink = ctl.into_sink();
    assert_eq!(sink.calls, vec![Call::Click(MouseButton::Left); 2]);
}

#[test]
fn test_moving_between_click_frames_restarts_the_gate() {
    let click = Pose::from_bits([1, 0, 0, 0, 0]);
    let point = Pose::from_bits([0, 1, 0, 0, 0]);

    let frames = (0..9)
        .map(|_| click.frame())
        .chain(std::iter::once(point.frame()))
        .chain((0..9).map(|_| click.frame()))
        .map(Observation::Hand);

    let (summary, sink) = run_loop(&Config::default(), Scripted::new(frames), Recorder::default());
    assert_eq!(summary.frames, 19);
    assert_eq!(sink.count(is_click), 0);
    assert_eq!(sink.moves().len(), 1);
}

// ============================================================================
// Scrolling and dragging
// ============================================================================

#[test]
fn test_fist_scrolls_down_once() {
    let pose = Pose::from_bits([0, 0, 0, 0, 0]);
    let (_, sink) = run_loop(&Config::default(), Scripted::repeat(&pose, 1), Recorder::default());
    assert_eq!(sink.calls, vec![Call::Scroll(-70)]);
}

#[test]
fn test_pinky_scrolls_up_once() {
    let pose = Pose::from_bits([0, 0, 0, 0, 1]);
    let (_, sink) = run_loop(&Config::default(), Scripted::repeat(&pose, 1), Recorder::default());
    assert_eq!(sink.calls, vec![Call::Scroll(70)]);
}

#[test]
fn test_configured_scroll_speed() {
    let mut config = Config::default();
    config.gestures.scroll_speed_down = -3;
    let pose = Pose::from_bits([0, 0, 0, 0, 0]);
    let (_, sink) = run_loop(&config, Scripted::repeat(&pose, 2), Recorder::default());
    assert_eq!(sink.calls, vec![Call::Scroll(-3), Call::Scroll(-3)]);
}

#[test]
fn test_tap_drag_presses_and_releases_every_frame() {
    let pose = Pose::from_bits([0, 1, 1, 1, 1]);
    let (summary, sink) = run_loop(&Config::default(), Scripted::repeat(&pose, 3), Recorder::default());

    assert_eq!(summary.actions, 3);
    assert_eq!(sink.calls.len(), 9);
    for chunk in sink.calls.chunks(3) {
        assert_eq!(chunk[0], Call::SetDrag(true));
        assert!(matches!(chunk[1], Call::MoveTo(_, _)));
        assert_eq!(chunk[2], Call::SetDrag(false));
    }
}

#[test]
fn test_hold_drag_survives_scroll_and_releases_on_move() {
    let drag = Pose::from_bits([0, 1, 1, 1, 1]);
    let fist = Pose::from_bits([0, 0, 0, 0, 0]);
    let point = Pose::from_bits([0, 1, 0, 0, 0]);

    let mut config = Config::default();
    config.motion.drag_mode = DragMode::Hold;

    let frames = [&drag, &drag, &fist, &drag, &point].map(|p| Observation::Hand(p.frame()));
    let (_, sink) = run_loop(&config, Scripted::new(frames), Recorder::default());

    let kinds: Vec<&str> = sink
        .calls
        .iter()
        .map(|c| match c {
            Call::SetDrag(true) => "press",
            Call::SetDrag(false) => "release",
            Call::MoveTo(..) => "move",
            Call::Scroll(_) => "scroll",
            _ => "other",
        })
        .collect();
    assert_eq!(
        kinds,
        ["press", "move", "move", "scroll", "move", "release", "move"]
    );
}

#[test]
fn test_loop_releases_held_drag_at_end_of_stream() {
    let drag = Pose::from_bits([0, 1, 1, 1, 1]);
    let mut config = Config::default();
    config.motion.drag_mode = DragMode::Hold;

    let (_, sink) = run_loop(&config, Scripted::repeat(&drag, 2), Recorder::default());
    assert_eq!(sink.calls.first(), Some(&Call::SetDrag(true)));
    assert_eq!(sink.calls.last(), Some(&Call::SetDrag(false)));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_injection_failure_drops_one_frame() {
    let pose = Pose::from_bits([0, 1, 0, 0, 0]);
    let target = target_of(&pose);

    let (summary, sink) = run_loop(
        &Config::default(),
        Scripted::repeat(&pose, 5),
        Recorder::failing_at(2),
    );

    assert_eq!(summary.frames, 5);
    assert_eq!(summary.dropped, 1);
    assert_eq!(summary.actions, 4);

    // The rejected third step was never committed, so the fourth frame
    // lands where the third would have
    let moves = sink.moves();
    assert_eq!(moves.len(), 4);
    let expected = 1.0 - 0.8f64.powi(3);
    assert!((moves[2].0 - expected * target.x).abs() < 1e-6);
    assert!((moves[2].1 - expected * target.y).abs() < 1e-6);
}

#[test]
fn test_failed_click_clears_the_gate() {
    let pose = Pose::from_bits([1, 0, 0, 0, 0]);
    let (summary, sink) = run_loop(
        &Config::default(),
        Scripted::repeat(&pose, 20),
        Recorder::failing_at(0),
    );

    // First click rejected, buffer refills, second click lands on frame 20
    assert_eq!(summary.dropped, 1);
    assert_eq!(sink.calls, vec![Call::Click(MouseButton::Left)]);
}

// ============================================================================
// Replay from a JSON-lines stream
// ============================================================================

#[test]
fn test_json_stream_replay() {
    let click = Pose::from_bits([1, 0, 0, 0, 0]);
    let fist = Pose::from_bits([0, 0, 0, 0, 0]);

    let mut text = String::new();
    for _ in 0..10 {
        text.push_str(&click.json_line());
        text.push('\n');
    }
    text.push_str("\n{broken\nnull\n");
    text.push_str(&fist.json_line());
    text.push('\n');

    let config = Config::default();
    let source = JsonLinesSource::with_camera(Cursor::new(text), &config.camera);
    let (summary, sink) = run_loop(&config, source, Recorder::default());

    assert_eq!(summary.frames, 12);
    assert_eq!(summary.hands, 11);
    assert_eq!(summary.dropped, 1);
    assert_eq!(
        sink.calls,
        vec![Call::Click(MouseButton::Left), Call::Scroll(-70)]
    );
}

#[test]
fn test_timing_report_after_run() {
    let pose = Pose::from_bits([0, 1, 0, 0, 0]);
    let controller = controller(&Config::default());
    let mut control = ControlLoop::new(Scripted::repeat(&pose, 4), controller);
    control.run(&AtomicBool::new(false)).unwrap();

    assert_eq!(control.timings().stage(Stage::Process).count(), 4);

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("timing.txt");
    control.timings().write_report(&path).unwrap();

    let report = std::fs::read_to_string(&path).unwrap();
    assert!(report.contains("acquire average : "));
    assert!(report.contains("process min : "));
}
