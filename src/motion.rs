//! Cursor mapping and motion smoothing.
//!
//! # Mapping
//!
//! The active region of the camera frame is the rectangle inset by `margin`
//! on every side. It is stretched linearly onto the whole screen, so the
//! cursor can reach screen corners without the hand reaching camera edges:
//!
//! ```text
//! camera (640x480, margin 170)              screen (1920x1080)
//! ┌──────────────────────────┐             ┌──────────────────────────┐
//! │   ┌──────────────────┐   │             │                          │
//! │   │  active region   │───┼────────────>│       whole screen       │
//! │   └──────────────────┘   │             │                          │
//! └──────────────────────────┘             └──────────────────────────┘
//! ```
//!
//! Positions outside the active region clamp to the nearest screen edge.
//!
//! # Smoothing
//!
//! An exponential moving average pulls the cursor toward the mapped target:
//!
//! ```text
//! new = prev + (target - prev) * alpha
//! ```
//!
//! One-shot actions are additionally gated by a [`StabilizationBuffer`]
//! that must fill up with positions close to each other before firing.

use std::collections::VecDeque;

use crate::landmarks::Point;

/// Linear interpolation from `[in_min, in_max]` to `[out_min, out_max]`,
/// clamped to the output range. NaN maps to `out_min`.
pub fn interp_clamped(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    let t = (value - in_min) / (in_max - in_min);
    if t.is_nan() {
        return out_min;
    }
    out_min + t.clamp(0.0, 1.0) * (out_max - out_min)
}

/// Map a raw camera position to screen coordinates through the margin
/// sub-rectangle. Always returns a point within `[0, screen_w] x [0, screen_h]`.
pub fn map_to_screen(
    raw_x: f64,
    raw_y: f64,
    frame_w: f64,
    frame_h: f64,
    screen_w: f64,
    screen_h: f64,
    margin: f64,
) -> (f64, f64) {
    (
        interp_clamped(raw_x, margin, frame_w - margin, 0.0, screen_w),
        interp_clamped(raw_y, margin, frame_h - margin, 0.0, screen_h),
    )
}

/// Camera-to-screen mapping with fixed geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorMapper {
    pub frame_width: f64,
    pub frame_height: f64,
    pub screen_width: f64,
    pub screen_height: f64,
    pub margin: f64,
}

impl CursorMapper {
    pub fn map(&self, raw: Point) -> Point {
        let (x, y) = map_to_screen(
            raw.x,
            raw.y,
            self.frame_width,
            self.frame_height,
            self.screen_width,
            self.screen_height,
            self.margin,
        );
        Point::new(x, y)
    }
}

/// One EMA step from `prev` toward `target`. `alpha` in `(0, 1]`.
pub fn smooth(prev: Point, target: Point, alpha: f64) -> Point {
    Point::new(
        prev.x + (target.x - prev.x) * alpha,
        prev.y + (target.y - prev.y) * alpha,
    )
}

/// Bounded FIFO of recent positions used to confirm the hand is still
/// before a one-shot action fires.
#[derive(Debug, Clone)]
pub struct StabilizationBuffer {
    positions: VecDeque<Point>,
    capacity: usize,
    radius: f64,
}

impl StabilizationBuffer {
    pub fn new(capacity: usize, radius: f64) -> Self {
        Self {
            positions: VecDeque::with_capacity(capacity),
            capacity,
            radius,
        }
    }

    /// Append a position, evicting the oldest when full
    pub fn push(&mut self, position: Point) {
        if self.positions.len() == self.capacity {
            self.positions.pop_front();
        }
        self.positions.push_back(position);
    }

    pub fn is_full(&self) -> bool {
        self.positions.len() == self.capacity
    }

    /// Full, and every position within `radius` of the oldest one
    pub fn is_stable(&self) -> bool {
        let Some(&anchor) = self.positions.front() else {
            return false;
        };
        self.is_full()
            && self
                .positions
                .iter()
                .all(|p| p.distance_to(anchor) <= self.radius)
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
