//! Hand landmark frames.
//!
//! The landmark provider hands over up to 21 id-tagged points per frame,
//! either normalized to `[0, 1]` or already in camera pixels. Everything
//! downstream works in camera pixel space, so conversion happens once, here.
//! A frame is either complete (21 unique, dense ids) or absent.

use serde::{Deserialize, Serialize};

// ============================================================================
// HAND LANDMARK INDICES
// ============================================================================

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Landmarks in a complete hand
pub const LANDMARK_COUNT: usize = 21;

/// Fingertips ordered thumb, index, middle, ring, pinky
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// A 2D position. In a [`LandmarkFrame`] this is camera pixels; after
/// mapping it is screen pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance
    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// How the provider expresses coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSpace {
    /// `[0, 1]` relative to the camera frame
    #[default]
    Normalized,
    /// Camera pixels
    Pixel,
}

/// One landmark as emitted by the provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawLandmark {
    pub id: usize,
    pub x: f64,
    pub y: f64,
}

/// A complete 21-point hand in camera pixel space
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    points: [Point; LANDMARK_COUNT],
}

impl LandmarkFrame {
    /// Wrap points that are already in camera pixel space, ordered by id
    pub fn from_pixels(points: [Point; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Build a frame from provider records.
    ///
    /// Returns `None` for anything short of a full hand: fewer or more than
    /// 21 records, duplicate or out-of-range ids, or non-finite coordinates.
    pub fn from_records(
        records: &[RawLandmark],
        space: CoordinateSpace,
        frame_width: f64,
        frame_height: f64,
    ) -> Option<Self> {
        if records.len() != LANDMARK_COUNT {
            return None;
        }

        let (scale_x, scale_y) = match space {
            CoordinateSpace::Normalized => (frame_width, frame_height),
            CoordinateSpace::Pixel => (1.0, 1.0),
        };

        let mut points = [Point::default(); LANDMARK_COUNT];
        let mut seen = [false; LANDMARK_COUNT];
        for record in records {
            if record.id >= LANDMARK_COUNT || seen[record.id] {
                return None;
            }
            if !record.x.is_finite() || !record.y.is_finite() {
                return None;
            }
            seen[record.id] = true;
            points[record.id] = Point::new(record.x * scale_x, record.y * scale_y);
        }

        Some(Self { points })
    }

    /// Landmark by index (see the `*_TIP`, `*_PIP` constants)
    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }

    /// Index fingertip, the cursor anchor
    pub fn index_tip(&self) -> Point {
        self.points[INDEX_TIP]
    }

    pub fn points(&self) -> &[Point; LANDMARK_COUNT] {
        &self.points
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// Angle at `joint` between the segments to `parent` and `child`, in
/// degrees within `[0, 180]`. A straight finger reads 180.
pub fn joint_angle(parent: Point, joint: Point, child: Point) -> f64 {
    let to_child = (child.y - joint.y).atan2(child.x - joint.x);
    let to_parent = (parent.y - joint.y).atan2(parent.x - joint.x);
    let angle = (to_child - to_parent).to_degrees().abs();
    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

/// Distance in per-mille of the frame: each axis is normalized by the
/// frame extent before measuring, so the value does not depend on camera
/// resolution.
pub fn frame_distance(a: Point, b: Point, frame_width: f64, frame_height: f64) -> f64 {
    let dx = (a.x - b.x) / frame_width;
    let dy = (a.y - b.y) / frame_height;
    dx.hypot(dy) * 1000.0
}
