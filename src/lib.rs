//! virtual-touch: a touch-free mouse.
//!
//! Hand-landmark frames come in, pointer actions go out. A hand tracker
//! (outside this crate) reports 21 landmarks per video frame; each frame is
//! reduced to a finger vector, classified into one gesture verdict, and
//! turned into at most one move, click, drag or scroll on the OS pointer.
//!
//! ```text
//! LandmarkProvider ─> GestureController ─> InputSink
//!   (source)           (controller)         (sink)
//!                        │
//!                        ├─ fingers   finger vector
//!                        ├─ gesture   priority rule table
//!                        └─ motion    mapping, EMA, stabilization
//! ```
//!
//! [`runtime::ControlLoop`] wires a provider and a controller into the
//! single-threaded frame loop the binary runs.

pub mod config;
pub mod controller;
pub mod error;
pub mod fingers;
pub mod gesture;
pub mod landmarks;
pub mod motion;
pub mod runtime;
pub mod sink;
pub mod source;
pub mod stats;

pub use config::Config;
pub use controller::{Action, CursorState, DragMode, FrameOutcome, GestureController, Phase};
pub use error::{Error, ErrorType, Result};
pub use fingers::{classify_fingers, FingerVector, Handedness};
pub use gesture::{GestureRules, GestureVerdict, HandGeometry};
pub use landmarks::{CoordinateSpace, LandmarkFrame, Point, RawLandmark};
pub use runtime::{ControlLoop, LoopSummary};
pub use sink::{InputSink, LogSink, MouseButton};
pub use source::{JsonLinesSource, LandmarkProvider, Observation};
