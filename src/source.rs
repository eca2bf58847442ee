//! Landmark providers.
//!
//! The hand-tracking model runs outside this crate. Whatever runs it hands
//! frames over through [`LandmarkProvider`], one call per loop iteration.
//! [`JsonLinesSource`] reads them from a newline-delimited JSON stream:
//!
//! ```text
//! {"landmarks":[{"id":0,"x":0.52,"y":0.81},{"id":1,"x":0.48,"y":0.77}, ...]}
//! {"landmarks":[]}
//! null
//! ```
//!
//! An empty list, a missing or `null` field, or a bare `null` line all mean
//! "no hand this frame". So does any record set short of a full hand.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;
use tracing::trace;

use crate::config::CameraConfig;
use crate::error::{Error, Result};
use crate::landmarks::{CoordinateSpace, LandmarkFrame, RawLandmark};

/// What the provider saw in one frame
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Hand(LandmarkFrame),
    NoHand,
}

impl Observation {
    pub fn hand(&self) -> Option<&LandmarkFrame> {
        match self {
            Observation::Hand(frame) => Some(frame),
            Observation::NoHand => None,
        }
    }
}

/// Source of landmark frames, in chronological order
pub trait LandmarkProvider {
    /// Block until the next frame is available.
    ///
    /// `Ok(None)` ends the stream. A recoverable error drops one frame; the
    /// next call continues after it.
    fn next_frame(&mut self) -> Result<Option<Observation>>;
}

impl<P: LandmarkProvider + ?Sized> LandmarkProvider for Box<P> {
    fn next_frame(&mut self) -> Result<Option<Observation>> {
        (**self).next_frame()
    }
}

#[derive(Debug, Deserialize)]
struct FrameRecord {
    #[serde(default)]
    landmarks: Option<Vec<RawLandmark>>,
}

/// Newline-delimited JSON landmark stream
pub struct JsonLinesSource<R> {
    reader: R,
    line: usize,
    buf: Vec<u8>,
    space: CoordinateSpace,
    frame_width: f64,
    frame_height: f64,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R, space: CoordinateSpace, frame_width: f64, frame_height: f64) -> Self {
        Self {
            reader,
            line: 0,
            buf: Vec::new(),
            space,
            frame_width,
            frame_height,
        }
    }

    /// Source using the camera geometry of a configuration
    pub fn with_camera(reader: R, camera: &CameraConfig) -> Self {
        Self::new(
            reader,
            camera.coordinate_space,
            f64::from(camera.width),
            f64::from(camera.height),
        )
    }

    /// Lines consumed so far
    pub fn line(&self) -> usize {
        self.line
    }

    fn decode(&self, text: &str) -> Result<Observation> {
        let record: Option<FrameRecord> =
            serde_json::from_str(text).map_err(|e| Error::LandmarkStream {
                line: self.line,
                reason: e.to_string(),
            })?;

        let records = match record.and_then(|r| r.landmarks) {
            Some(records) if !records.is_empty() => records,
            _ => return Ok(Observation::NoHand),
        };

        match LandmarkFrame::from_records(&records, self.space, self.frame_width, self.frame_height)
        {
            Some(frame) => Ok(Observation::Hand(frame)),
            None => {
                trace!(line = self.line, count = records.len(), "Incomplete hand");
                Ok(Observation::NoHand)
            }
        }
    }
}

impl JsonLinesSource<BufReader<File>> {
    /// Open a recorded stream
    pub fn open(path: &Path, camera: &CameraConfig) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::with_camera(BufReader::new(file), camera))
    }
}

impl<R: BufRead> LandmarkProvider for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<Observation>> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let text = std::str::from_utf8(&self.buf)
                .map_err(|e| Error::LandmarkStream {
                    line: self.line,
                    reason: e.to_string(),
                })?
                .trim();
            if text.is_empty() {
                continue;
            }
            return self.decode(text).map(Some);
        }
    }
}
