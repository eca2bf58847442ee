//! Gesture classification.
//!
//! Maps one frame's finger vector plus a few geometric measurements to a
//! single [`GestureVerdict`]. Rules are evaluated in a fixed priority order
//! and the first match wins, so verdicts are mutually exclusive.
//!
//! | # | Condition | Verdict |
//! |---|-----------|---------|
//! | 1 | thumb–index pinch, index extended | `Move` |
//! | 2 | index curled, thumb away, middle extended | `LeftClick` |
//! | 3 | middle curled, thumb away, index extended | `RightClick` |
//! | 4 | index and middle curled, thumb away | `DoubleClick` |
//! | 5 | index and middle curled, thumb pinched | `Screenshot` |
//! | 6 | `[0,1,0,0,0]` | `Move` |
//! | 7 | `[1,0,0,0,0]` | `LeftClick` |
//! | 8 | `[1,1,0,0,1]` | `RightClick` |
//! | 9 | `[0,1,1,1,1]` | `Drag` |
//! | 10 | `[0,0,0,0,0]` | `ScrollDown` |
//! | 11 | `[0,0,0,0,1]` | `ScrollUp` |
//! | 12 | anything else | `None` |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fingers::FingerVector;
use crate::landmarks::{
    frame_distance, joint_angle, LandmarkFrame, INDEX_MCP, INDEX_PIP, INDEX_TIP, MIDDLE_MCP,
    MIDDLE_PIP, MIDDLE_TIP, THUMB_TIP,
};

/// One discrete decision per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GestureVerdict {
    /// No rule matched, or no hand
    #[default]
    None,
    Move,
    LeftClick,
    RightClick,
    DoubleClick,
    Drag,
    ScrollUp,
    ScrollDown,
    Screenshot,
}

impl GestureVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Move => "move",
            Self::LeftClick => "left-click",
            Self::RightClick => "right-click",
            Self::DoubleClick => "double-click",
            Self::Drag => "drag",
            Self::ScrollUp => "scroll-up",
            Self::ScrollDown => "scroll-down",
            Self::Screenshot => "screenshot",
        }
    }

    /// One-shot verdicts that must pass the stabilization gate
    pub fn is_click(&self) -> bool {
        matches!(
            self,
            Self::LeftClick | Self::RightClick | Self::DoubleClick | Self::Screenshot
        )
    }

    pub fn is_scroll(&self) -> bool {
        matches!(self, Self::ScrollUp | Self::ScrollDown)
    }
}

impl fmt::Display for GestureVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Auxiliary measurements feeding the geometric rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandGeometry {
    /// Thumb tip to index MCP, per-mille of the frame
    pub thumb_index_distance: f64,
    /// Angle at the index PIP joint, degrees (180 = straight)
    pub angle_index: f64,
    /// Angle at the middle PIP joint, degrees (180 = straight)
    pub angle_middle: f64,
}

impl HandGeometry {
    pub fn measure(frame: &LandmarkFrame, frame_width: f64, frame_height: f64) -> Self {
        Self {
            thumb_index_distance: frame_distance(
                frame.point(THUMB_TIP),
                frame.point(INDEX_MCP),
                frame_width,
                frame_height,
            ),
            angle_index: joint_angle(
                frame.point(INDEX_MCP),
                frame.point(INDEX_PIP),
                frame.point(INDEX_TIP),
            ),
            angle_middle: joint_angle(
                frame.point(MIDDLE_MCP),
                frame.point(MIDDLE_PIP),
                frame.point(MIDDLE_TIP),
            ),
        }
    }
}

/// Thresholds for the geometric rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureRules {
    /// Below this thumb–index distance the thumb counts as pinched;
    /// above it, as held away
    pub pinch_distance: f64,
    /// Joint angle below which a finger counts as curled
    pub curled_angle_deg: f64,
    /// Joint angle above which a finger counts as extended
    pub extended_angle_deg: f64,
}

impl Default for GestureRules {
    fn default() -> Self {
        Self {
            pinch_distance: 50.0,
            curled_angle_deg: 50.0,
            extended_angle_deg: 90.0,
        }
    }
}

const INDEX_ONLY: FingerVector = FingerVector::from_bits([0, 1, 0, 0, 0]);
const THUMB_ONLY: FingerVector = FingerVector::from_bits([1, 0, 0, 0, 0]);
const THUMB_INDEX_PINKY: FingerVector = FingerVector::from_bits([1, 1, 0, 0, 1]);
const ALL_BUT_THUMB: FingerVector = FingerVector::from_bits([0, 1, 1, 1, 1]);
const FIST: FingerVector = FingerVector::from_bits([0, 0, 0, 0, 0]);
const PINKY_ONLY: FingerVector = FingerVector::from_bits([0, 0, 0, 0, 1]);

impl GestureRules {
    /// First matching rule wins.
    pub fn classify(&self, fingers: FingerVector, geometry: &HandGeometry) -> GestureVerdict {
        let pinched = geometry.thumb_index_distance < self.pinch_distance;
        let thumb_away = geometry.thumb_index_distance > self.pinch_distance;
        let index_curled = geometry.angle_index < self.curled_angle_deg;
        let index_extended = geometry.angle_index > self.extended_angle_deg;
        let middle_curled = geometry.angle_middle < self.curled_angle_deg;
        let middle_extended = geometry.angle_middle > self.extended_angle_deg;

        if pinched && index_extended {
            return GestureVerdict::Move;
        }
        if index_curled && thumb_away && middle_extended {
            return GestureVerdict::LeftClick;
        }
        if middle_curled && thumb_away && index_extended {
            return GestureVerdict::RightClick;
        }
        if index_curled && middle_curled && thumb_away {
            return GestureVerdict::DoubleClick;
        }
        if index_curled && middle_curled && pinched {
            return GestureVerdict::Screenshot;
        }

        match fingers {
            INDEX_ONLY => GestureVerdict::Move,
            THUMB_ONLY => GestureVerdict::LeftClick,
            THUMB_INDEX_PINKY => GestureVerdict::RightClick,
            ALL_BUT_THUMB => GestureVerdict::Drag,
            FIST => GestureVerdict::ScrollDown,
            PINKY_ONLY => GestureVerdict::ScrollUp,
            _ => GestureVerdict::None,
        }
    }
}
