//! Shared fixtures: synthetic hand poses, a recording sink and a scripted
//! landmark provider.

#![allow(dead_code)]

use std::collections::VecDeque;

use virtual_touch::landmarks::{
    INDEX_MCP, INDEX_TIP, LANDMARK_COUNT, MIDDLE_MCP, PINKY_MCP, RING_MCP, THUMB_IP, THUMB_TIP,
};
use virtual_touch::{
    Error, InputSink, LandmarkFrame, LandmarkProvider, MouseButton, Observation, Point, Result,
};

// ============================================================================
// Poses
// ============================================================================

/// Camera frame size the poses are drawn in
pub const FRAME_W: f64 = 640.0;
pub const FRAME_H: f64 = 480.0;

/// Finger shape in a synthetic pose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Straight up, 180 degrees at the PIP
    Raised,
    /// Tip below the PIP, about 70 degrees: neither curled nor extended
    Lowered,
    /// Tip well below the PIP, 30 degrees
    Curled,
}

/// Builder for a right hand in camera pixels. Fingers stand in columns with
/// their MCP joints on y = 300 and the PIP 50 px above.
#[derive(Debug, Clone)]
pub struct Pose {
    thumb_raised: bool,
    pinched: bool,
    fingers: [Shape; 4],
    offset: Point,
}

impl Pose {
    /// Build from a finger vector, e.g. `[0, 1, 0, 0, 0]`
    pub fn from_bits(bits: [u8; 5]) -> Self {
        let shape = |b: u8| if b != 0 { Shape::Raised } else { Shape::Lowered };
        Self {
            thumb_raised: bits[0] != 0,
            pinched: false,
            fingers: [shape(bits[1]), shape(bits[2]), shape(bits[3]), shape(bits[4])],
            offset: Point::new(0.0, 0.0),
        }
    }

    pub fn index(mut self, shape: Shape) -> Self {
        self.fingers[0] = shape;
        self
    }

    pub fn middle(mut self, shape: Shape) -> Self {
        self.fingers[1] = shape;
        self
    }

    /// Thumb tip touching the index MCP
    pub fn pinched(mut self) -> Self {
        self.pinched = true;
        self
    }

    /// Shift the whole hand
    pub fn shifted(mut self, dx: f64, dy: f64) -> Self {
        self.offset = Point::new(self.offset.x + dx, self.offset.y + dy);
        self
    }

    pub fn points(&self) -> [Point; LANDMARK_COUNT] {
        let mut points = [Point::new(320.0, 380.0); LANDMARK_COUNT];

        for (i, &mcp) in [INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP].iter().enumerate() {
            let x = 300.0 + 20.0 * i as f64;
            let pip = Point::new(x, 250.0);
            points[mcp] = Point::new(x, 300.0);
            points[mcp + 1] = pip;
            let tip = match self.fingers[i] {
                Shape::Raised => Point::new(x, 200.0),
                Shape::Lowered => Point::new(pip.x + 37.6, pip.y + 13.7),
                Shape::Curled => Point::new(pip.x + 20.0, pip.y + 34.6),
            };
            points[mcp + 2] = Point::new((pip.x + tip.x) / 2.0, (pip.y + tip.y) / 2.0);
            points[mcp + 3] = tip;
        }

        // Unless pinched, the thumb is held well away from the index MCP
        if self.pinched {
            points[THUMB_IP] = Point::new(320.0, 320.0);
            points[THUMB_TIP] = Point::new(305.0, 305.0);
        } else if self.thumb_raised {
            points[THUMB_IP] = Point::new(380.0, 310.0);
            points[THUMB_TIP] = Point::new(400.0, 320.0);
        } else {
            points[THUMB_IP] = Point::new(220.0, 310.0);
            points[THUMB_TIP] = Point::new(200.0, 320.0);
        }

        points.map(|p| Point::new(p.x + self.offset.x, p.y + self.offset.y))
    }

    pub fn frame(&self) -> LandmarkFrame {
        LandmarkFrame::from_pixels(self.points())
    }

    pub fn index_tip(&self) -> Point {
        self.points()[INDEX_TIP]
    }

    /// One JSON line in normalized coordinates
    pub fn json_line(&self) -> String {
        let records: Vec<String> = self
            .points()
            .iter()
            .enumerate()
            .map(|(id, p)| format!(r#"{{"id":{id},"x":{},"y":{}}}"#, p.x / FRAME_W, p.y / FRAME_H))
            .collect();
        format!(r#"{{"landmarks":[{}]}}"#, records.join(","))
    }
}

// ============================================================================
// Recording sink
// ============================================================================

/// One sink call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Call {
    MoveTo(f64, f64),
    Click(MouseButton),
    DoubleClick,
    SetDrag(bool),
    Scroll(i32),
}

/// Sink that records every successful call and can be told to fail
#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<Call>,
    /// Reject the n-th call (0-based, counting rejected ones too)
    pub fail_at: Option<usize>,
    attempts: usize,
}

impl Recorder {
    pub fn failing_at(n: usize) -> Self {
        Self {
            fail_at: Some(n),
            ..Self::default()
        }
    }

    pub fn moves(&self) -> Vec<(f64, f64)> {
        self.calls
            .iter()
            .filter_map(|c| match *c {
                Call::MoveTo(x, y) => Some((x, y)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    fn record(&mut self, action: &'static str, call: Call) -> Result<()> {
        let n = self.attempts;
        self.attempts += 1;
        if self.fail_at == Some(n) {
            return Err(Error::injection(action, "rejected by test"));
        }
        self.calls.push(call);
        Ok(())
    }
}

impl InputSink for Recorder {
    fn move_to(&mut self, x: f64, y: f64) -> Result<()> {
        self.record("move_to", Call::MoveTo(x, y))
    }

    fn click(&mut self, button: MouseButton) -> Result<()> {
        self.record("click", Call::Click(button))
    }

    fn double_click(&mut self) -> Result<()> {
        self.record("double_click", Call::DoubleClick)
    }

    fn set_drag(&mut self, held: bool) -> Result<()> {
        self.record("set_drag", Call::SetDrag(held))
    }

    fn scroll(&mut self, delta: i32) -> Result<()> {
        self.record("scroll", Call::Scroll(delta))
    }
}

// ============================================================================
// Scripted provider
// ============================================================================

/// Provider replaying a fixed list of observations
pub struct Scripted(VecDeque<Observation>);

impl Scripted {
    pub fn new(observations: impl IntoIterator<Item = Observation>) -> Self {
        Self(observations.into_iter().collect())
    }

    /// `count` identical frames of one pose
    pub fn repeat(pose: &Pose, count: usize) -> Self {
        Self::new(std::iter::repeat_with(|| Observation::Hand(pose.frame())).take(count))
    }
}

impl LandmarkProvider for Scripted {
    fn next_frame(&mut self) -> Result<Option<Observation>> {
        Ok(self.0.pop_front())
    }
}
