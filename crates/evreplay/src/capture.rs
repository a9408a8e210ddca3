//! The capture multiplexer.
//!
//! Observes N independent input sources and serializes their events
//! into one ordered log without loss or reordering relative to true
//! arrival time, as seen through the readiness wait.
//!
//! # Ordering
//!
//! Within one wait cycle, ready sources are drained in ascending
//! source index; across cycles, total order follows wait-cycle order.
//! This approximates true hardware arrival order bounded by the wait
//! primitive's granularity; it is a known limitation of the readiness
//! model, not a defect. Each source's own events always appear in the
//! log in the order that source produced them.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use evtap::traits::{EventSource, Readiness};

use crate::error::Result;
use crate::log::LogWriter;

/// Totals for a finished capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSummary {
    /// Records appended to the log.
    pub records: u64,
}

/// Merges events from many sources into one ordered log.
///
/// Runs single-threaded; the only suspension point is the blocking
/// readiness wait. Any short read, short write, or wait failure is
/// fatal and ends the session immediately with the log valid up to
/// the last fully persisted record.
#[derive(Debug)]
pub struct Capture<S, P, W>
where
    S: EventSource,
    P: Readiness,
    W: Write,
{
    sources: Vec<S>,
    poller: P,
    log: LogWriter<W>,
    stop: Arc<AtomicBool>,
}

impl<S, P, W> Capture<S, P, W>
where
    S: EventSource,
    P: Readiness,
    W: Write,
{
    /// Build a capture session over already-open sources.
    ///
    /// The poller must watch the same sources, in the same order;
    /// source index `i` in the log refers to `sources[i]`.
    pub fn new(sources: Vec<S>, poller: P, log: LogWriter<W>) -> Self {
        Self {
            sources,
            poller,
            log,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Use an externally shared stop flag.
    ///
    /// Raising the flag ends the session after the current wait cycle
    /// finishes draining; typically wired to SIGINT/SIGTERM.
    #[must_use]
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// A handle to this session's stop flag.
    #[must_use]
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Capture until the stop flag is raised or a fatal error occurs.
    ///
    /// Blocks on the readiness wait, drains every ready source in
    /// ascending index order (one event per ready source per cycle),
    /// and appends each `(source_index, event)` pair to the log.
    pub fn run(&mut self) -> Result<CaptureSummary> {
        debug!(sources = self.sources.len(), "capture session started");

        while !self.stop.load(Ordering::Relaxed) {
            let ready = self.poller.wait()?;
            for index in ready {
                let event = self.sources[index].read_event()?;
                trace!(
                    source = index,
                    kind = event.kind,
                    code = event.code,
                    value = event.value,
                    "captured event"
                );
                self.log.append(index as i32, &event)?;
            }
        }

        self.log.flush()?;
        let summary = CaptureSummary {
            records: self.log.records(),
        };
        debug!(records = summary.records, "capture session stopped");
        Ok(summary)
    }

    /// Unwrap the log writer, e.g. to inspect captured bytes in tests.
    pub fn into_log(self) -> LogWriter<W> {
        self.log
    }
}
