//! Per-stage latency statistics.
//!
//! The control loop times how long it waits for a frame and how long the
//! frame takes to process. At shutdown the figures can be written as a
//! plain-text report, one line per stage, in seconds:
//!
//! ```text
//! acquire average : 0.03312    acquire max : 0.04120    acquire min : 0.03001
//! process average : 0.00021    process max : 0.00102    process min : 0.00003
//! ```

use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Timed loop stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Waiting for the provider
    Acquire,
    /// Classification, mapping and injection
    Process,
}

impl Stage {
    pub const ALL: [Stage; 2] = [Stage::Acquire, Stage::Process];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Acquire => "acquire",
            Stage::Process => "process",
        }
    }
}

/// Running min/max/mean of one stage
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageStats {
    count: u32,
    total: Duration,
    max: Duration,
    min: Option<Duration>,
}

impl StageStats {
    pub fn record(&mut self, elapsed: Duration) {
        self.count = self.count.saturating_add(1);
        self.total += elapsed;
        self.max = self.max.max(elapsed);
        self.min = Some(self.min.map_or(elapsed, |min| min.min(elapsed)));
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn average(&self) -> Option<Duration> {
        (self.count > 0).then(|| self.total / self.count)
    }

    pub fn max(&self) -> Option<Duration> {
        (self.count > 0).then_some(self.max)
    }

    pub fn min(&self) -> Option<Duration> {
        self.min
    }
}

/// Timings for every loop stage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageTimings {
    acquire: StageStats,
    process: StageStats,
}

impl StageTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stage: Stage, elapsed: Duration) {
        match stage {
            Stage::Acquire => self.acquire.record(elapsed),
            Stage::Process => self.process.record(elapsed),
        }
    }

    pub fn stage(&self, stage: Stage) -> &StageStats {
        match stage {
            Stage::Acquire => &self.acquire,
            Stage::Process => &self.process,
        }
    }

    /// Report text. Stages without samples are left out.
    pub fn report(&self) -> String {
        let mut out = String::new();
        for stage in Stage::ALL {
            let stats = self.stage(stage);
            let (Some(avg), Some(max), Some(min)) = (stats.average(), stats.max(), stats.min())
            else {
                continue;
            };
            let name = stage.as_str();
            let _ = writeln!(
                out,
                "{name} average : {:.5}    {name} max : {:.5}    {name} min : {:.5}",
                avg.as_secs_f64(),
                max.as_secs_f64(),
                min.as_secs_f64(),
            );
        }
        out
    }

    /// Write [`report`](Self::report) to `path`, replacing any existing file
    pub fn write_report(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.report())?;
        Ok(())
    }
}
