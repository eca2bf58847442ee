//! Finger posture classification.
//!
//! Each frame is reduced to five "raised" flags, ordered thumb, index,
//! middle, ring, pinky. Classification is instantaneous: no smoothing or
//! hysteresis happens at this layer.
//!
//! The thumb test compares horizontal positions and therefore assumes an
//! upright hand facing the camera. A hand turned sideways will misreport
//! its thumb; that is a known limitation, not something to correct here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::landmarks::{LandmarkFrame, FINGERTIPS, THUMB_TIP};

/// Which hand the provider is tracking. Decides the direction of the thumb test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    /// Thumb raised when its tip lies right of the IP joint
    #[default]
    Right,
    /// Thumb raised when its tip lies left of the IP joint
    Left,
}

/// Five "finger raised" flags: thumb, index, middle, ring, pinky
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FingerVector(pub [bool; 5]);

impl FingerVector {
    pub const THUMB: usize = 0;
    pub const INDEX: usize = 1;
    pub const MIDDLE: usize = 2;
    pub const RING: usize = 3;
    pub const PINKY: usize = 4;

    /// Build from 0/1 flags, e.g. `FingerVector::from_bits([0, 1, 0, 0, 0])`
    pub const fn from_bits(bits: [u8; 5]) -> Self {
        Self([
            bits[0] != 0,
            bits[1] != 0,
            bits[2] != 0,
            bits[3] != 0,
            bits[4] != 0,
        ])
    }

    pub fn is_raised(&self, finger: usize) -> bool {
        self.0[finger]
    }

    pub fn raised_count(&self) -> usize {
        self.0.iter().filter(|raised| **raised).count()
    }
}

impl fmt::Display for FingerVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e] = self.0.map(u8::from);
        write!(f, "[{a},{b},{c},{d},{e}]")
    }
}

/// Classify which fingers are raised.
///
/// Thumb: tip (4) against IP joint (3) on the X axis. Other fingers: tip
/// against the PIP joint two landmarks back on the Y axis; raised when the
/// tip is higher on screen (smaller Y, image Y grows downward).
pub fn classify_fingers(frame: &LandmarkFrame, handedness: Handedness) -> FingerVector {
    let mut fingers = [false; 5];

    let thumb_tip = frame.point(THUMB_TIP);
    let thumb_ip = frame.point(THUMB_TIP - 1);
    fingers[FingerVector::THUMB] = match handedness {
        Handedness::Right => thumb_tip.x > thumb_ip.x,
        Handedness::Left => thumb_tip.x < thumb_ip.x,
    };

    for (finger, &tip) in FINGERTIPS.iter().enumerate().skip(1) {
        fingers[finger] = frame.point(tip).y < frame.point(tip - 2).y;
    }

    FingerVector(fingers)
}
