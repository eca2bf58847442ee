//! Gesture controller.
//!
//! Owns all state that survives between frames and turns each frame into at
//! most one pointer action:
//!
//! ```text
//! LandmarkFrame ─> classify_fingers ─> GestureRules::classify ─> verdict
//!                                                                  │
//!        ┌──────────────────────┬──────────────────────┬───────────┤
//!        ▼                      ▼                      ▼           ▼
//!   Move / Drag          click-class verdicts       Scroll       None
//!   map + smooth         stabilization gate         scroll(n)    nothing
//!   move_to(x, y)        click / double-click
//! ```
//!
//! # State machine
//!
//! | From | Verdict | To | Effect |
//! |------|---------|----|--------|
//! | Idle/Moving | Move | Moving | smoothed `move_to` |
//! | any | click-class, gate stable | Idle | one-shot action, buffer cleared |
//! | Idle/Moving | Drag | Dragging | press, smoothed `move_to`, release (tap) |
//! | Dragging | Move or click-class | Idle/Moving | release if held |
//! | any | Scroll | unchanged | `scroll(speed)` |
//! | any | None | unchanged | nothing |
//!
//! Frames must arrive in chronological order: the EMA and the
//! stabilization buffer both depend on it.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::Result;
use crate::fingers::{classify_fingers, FingerVector, Handedness};
use crate::gesture::{GestureRules, GestureVerdict, HandGeometry};
use crate::landmarks::{LandmarkFrame, Point};
use crate::motion::{smooth, CursorMapper, StabilizationBuffer};
use crate::sink::{InputSink, MouseButton};

/// How the Drag verdict drives the left button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragMode {
    /// Press, move and release within every Drag frame
    #[default]
    Tap,
    /// Keep the button held across Drag frames; release when the posture ends
    Hold,
}

/// Controller phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Moving,
    Dragging,
}

/// Cursor state carried from frame to frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CursorState {
    /// Last smoothed cursor position (screen space, before mirroring)
    pub prev: Point,
    /// Left button currently held by a drag
    pub drag_held: bool,
}

/// What the controller did with a frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Action {
    #[default]
    None,
    Move {
        x: f64,
        y: f64,
    },
    Click(MouseButton),
    DoubleClick,
    /// Debounced screenshot request. Capturing is up to the caller.
    Screenshot,
    Drag {
        x: f64,
        y: f64,
    },
    Scroll(i32),
}

/// Result of processing one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameOutcome {
    pub verdict: GestureVerdict,
    /// `None` when no hand was present
    pub fingers: Option<FingerVector>,
    pub action: Action,
}

/// Frame-at-a-time gesture controller
pub struct GestureController<S: InputSink> {
    sink: S,
    mapper: CursorMapper,
    rules: GestureRules,
    handedness: Handedness,
    mirror_x: bool,
    smooth_alpha: f64,
    drag_mode: DragMode,
    scroll_speed_up: i32,
    scroll_speed_down: i32,

    cursor: CursorState,
    phase: Phase,
    stabilizer: StabilizationBuffer,
    /// Click-class verdict the stabilizer is currently collecting for
    armed: Option<GestureVerdict>,
}

impl<S: InputSink> GestureController<S> {
    /// Create a controller. Fails on an invalid configuration.
    pub fn new(config: &Config, sink: S) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            sink,
            mapper: config.mapper(),
            rules: config.gestures.rules(),
            handedness: config.camera.handedness,
            mirror_x: config.camera.mirror_x,
            smooth_alpha: config.motion.smooth_alpha,
            drag_mode: config.motion.drag_mode,
            scroll_speed_up: config.gestures.scroll_speed_up,
            scroll_speed_down: config.gestures.scroll_speed_down,
            cursor: CursorState::default(),
            phase: Phase::Idle,
            stabilizer: StabilizationBuffer::new(
                config.motion.stabilization_capacity,
                config.motion.stabilization_radius,
            ),
            armed: None,
        })
    }

    /// Process one frame. `None` means no hand was found and changes nothing.
    ///
    /// An injection failure is returned as a recoverable error; the frame's
    /// action is dropped and the state stays as it was before the failed call.
    pub fn process_frame(&mut self, frame: Option<&LandmarkFrame>) -> Result<FrameOutcome> {
        let Some(frame) = frame else {
            trace!("No hand");
            return Ok(FrameOutcome::default());
        };

        let fingers = classify_fingers(frame, self.handedness);
        let geometry =
            HandGeometry::measure(frame, self.mapper.frame_width, self.mapper.frame_height);
        let verdict = self.rules.classify(fingers, &geometry);
        trace!(
            %fingers,
            distance = geometry.thumb_index_distance,
            angle_index = geometry.angle_index,
            angle_middle = geometry.angle_middle,
            %verdict,
            "Classified frame"
        );

        let action = self.apply(verdict, frame.index_tip())?;
        Ok(FrameOutcome {
            verdict,
            fingers: Some(fingers),
            action,
        })
    }

    /// Release a held drag. Call when the loop stops.
    pub fn finish(&mut self) -> Result<()> {
        self.release_drag()?;
        self.phase = Phase::Idle;
        Ok(())
    }

    /// Forget all cross-frame state. A held drag is released first; if that
    /// fails nothing is reset and the drag stays tracked as held.
    pub fn reset(&mut self) -> Result<()> {
        self.release_drag()?;
        self.cursor = CursorState::default();
        self.phase = Phase::Idle;
        self.disarm();
        Ok(())
    }

    pub fn cursor_state(&self) -> CursorState {
        self.cursor
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Samples collected toward the next one-shot action
    pub fn pending_samples(&self) -> usize {
        self.stabilizer.len()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn apply(&mut self, verdict: GestureVerdict, anchor: Point) -> Result<Action> {
        match verdict {
            GestureVerdict::None => Ok(Action::None),
            GestureVerdict::ScrollUp => self.perform(Action::Scroll(self.scroll_speed_up)),
            GestureVerdict::ScrollDown => self.perform(Action::Scroll(self.scroll_speed_down)),
            GestureVerdict::Move => {
                self.release_drag()?;
                self.disarm();
                let next = self.step_toward(anchor);
                let out = self.to_screen(next);
                let action = self.perform(Action::Move { x: out.x, y: out.y })?;
                self.cursor.prev = next;
                self.phase = Phase::Moving;
                Ok(action)
            }
            GestureVerdict::Drag => self.drag(anchor),
            GestureVerdict::LeftClick => {
                self.debounced(verdict, anchor, Action::Click(MouseButton::Left))
            }
            GestureVerdict::RightClick => {
                self.debounced(verdict, anchor, Action::Click(MouseButton::Right))
            }
            GestureVerdict::DoubleClick => self.debounced(verdict, anchor, Action::DoubleClick),
            GestureVerdict::Screenshot => self.debounced(verdict, anchor, Action::Screenshot),
        }
    }

    fn drag(&mut self, anchor: Point) -> Result<Action> {
        self.disarm();

        if !self.cursor.drag_held {
            self.sink.set_drag(true)?;
            self.cursor.drag_held = true;
            debug!("Drag pressed");
        }

        let next = self.step_toward(anchor);
        let out = self.to_screen(next);
        let moved = self.sink.move_to(out.x, out.y);
        if moved.is_ok() {
            self.cursor.prev = next;
        }
        if self.drag_mode == DragMode::Tap {
            self.release_drag()?;
        }
        moved?;

        self.phase = Phase::Dragging;
        Ok(Action::Drag { x: out.x, y: out.y })
    }

    /// Collect a sample for `verdict` and fire `action` once the hand has
    /// been steady for a full buffer. Samples are mapped screen positions
    /// without smoothing, so the radius applies to real hand motion. The
    /// cursor does not move.
    fn debounced(&mut self, verdict: GestureVerdict, anchor: Point, action: Action) -> Result<Action> {
        self.release_drag()?;
        self.phase = Phase::Idle;

        if self.armed != Some(verdict) {
            self.stabilizer.clear();
            self.armed = Some(verdict);
        }
        self.stabilizer.push(self.mapper.map(anchor));

        if !self.stabilizer.is_stable() {
            trace!(
                %verdict,
                samples = self.stabilizer.len(),
                capacity = self.stabilizer.capacity(),
                "Waiting for a steady hand"
            );
            return Ok(Action::None);
        }

        self.stabilizer.clear();
        debug!(%verdict, "Firing one-shot action");
        self.perform(action)
    }

    fn release_drag(&mut self) -> Result<()> {
        if self.cursor.drag_held {
            self.sink.set_drag(false)?;
            self.cursor.drag_held = false;
            debug!("Drag released");
        }
        Ok(())
    }

    fn disarm(&mut self) {
        self.armed = None;
        self.stabilizer.clear();
    }

    /// Next smoothed position toward the mapped anchor
    fn step_toward(&self, anchor: Point) -> Point {
        smooth(self.cursor.prev, self.mapper.map(anchor), self.smooth_alpha)
    }

    fn to_screen(&self, p: Point) -> Point {
        if self.mirror_x {
            Point::new(self.mapper.screen_width - p.x, p.y)
        } else {
            p
        }
    }

    fn perform(&mut self, action: Action) -> Result<Action> {
        match action {
            Action::None | Action::Screenshot => {}
            Action::Move { x, y } => self.sink.move_to(x, y)?,
            Action::Click(button) => self.sink.click(button)?,
            Action::DoubleClick => self.sink.double_click()?,
            Action::Drag { x, y } => self.sink.move_to(x, y)?,
            Action::Scroll(delta) => self.sink.scroll(delta)?,
        }
        Ok(action)
    }
}
