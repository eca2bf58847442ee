//! Frame loop.
//!
//! Single-threaded: acquire one frame, run it through the controller to
//! completion, then acquire the next. The provider call is the only place
//! the loop blocks. The loop ends when the provider runs dry, when the stop
//! flag is raised, or on a fatal error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{info, warn};

use crate::controller::{Action, GestureController};
use crate::error::Result;
use crate::sink::InputSink;
use crate::source::{LandmarkProvider, Observation};
use crate::stats::{Stage, StageTimings};

/// Counters for one run of the loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Frames delivered by the provider
    pub frames: u64,
    /// Frames that contained a complete hand
    pub hands: u64,
    /// Frames that produced an action
    pub actions: u64,
    /// Screenshot requests
    pub screenshots: u64,
    /// Frames dropped on a recoverable error
    pub dropped: u64,
}

/// Drives a [`GestureController`] from a [`LandmarkProvider`]
pub struct ControlLoop<P, S: InputSink> {
    provider: P,
    controller: GestureController<S>,
    timings: StageTimings,
}

impl<P: LandmarkProvider, S: InputSink> ControlLoop<P, S> {
    pub fn new(provider: P, controller: GestureController<S>) -> Self {
        Self {
            provider,
            controller,
            timings: StageTimings::new(),
        }
    }

    /// Run until the stream ends or `stop` is set.
    ///
    /// A held drag is released on the way out, whatever the reason.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<LoopSummary> {
        info!("Control loop started");
        if let Err(e) = self.controller.reset() {
            warn!(error = %e, "Failed to release drag on start");
        }

        let mut summary = LoopSummary::default();
        let result = self.run_frames(stop, &mut summary);

        if let Err(e) = self.controller.finish() {
            warn!(error = %e, "Failed to release drag on shutdown");
        }

        info!(
            frames = summary.frames,
            hands = summary.hands,
            actions = summary.actions,
            dropped = summary.dropped,
            "Control loop stopped"
        );
        result.map(|()| summary)
    }

    fn run_frames(&mut self, stop: &AtomicBool, summary: &mut LoopSummary) -> Result<()> {
        while !stop.load(Ordering::SeqCst) {
            let started = Instant::now();
            let next = self.provider.next_frame();
            self.timings.record(Stage::Acquire, started.elapsed());

            let observation = match next {
                Ok(Some(observation)) => observation,
                Ok(None) => {
                    info!("Landmark stream ended");
                    return Ok(());
                }
                Err(e) if e.is_recoverable() => {
                    warn!(error = %e, "Dropping frame");
                    summary.dropped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            summary.frames += 1;
            if let Observation::Hand(_) = observation {
                summary.hands += 1;
            }

            let started = Instant::now();
            let processed = self.controller.process_frame(observation.hand());
            self.timings.record(Stage::Process, started.elapsed());

            match processed {
                Ok(outcome) => match outcome.action {
                    Action::None => {}
                    Action::Screenshot => {
                        info!("Screenshot requested");
                        summary.actions += 1;
                        summary.screenshots += 1;
                    }
                    _ => summary.actions += 1,
                },
                Err(e) if e.is_recoverable() => {
                    warn!(error = %e, "Dropping frame");
                    summary.dropped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!("Stop requested");
        Ok(())
    }

    /// Latency figures collected so far
    pub fn timings(&self) -> &StageTimings {
        &self.timings
    }

    pub fn controller(&self) -> &GestureController<S> {
        &self.controller
    }

    pub fn into_parts(self) -> (P, GestureController<S>) {
        (self.provider, self.controller)
    }
}
