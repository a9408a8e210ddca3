//! evreplay: input-event capture and timed replay
//!
//! This crate records raw kernel input events (touch, key, motion)
//! from multiple sources into a compact binary log, and later replays
//! that log against output devices with the original inter-event
//! timing reconstructed: the engine behind deterministic UI/input
//! testing.
//!
//! # Architecture
//!
//! Two independent pipelines share the log format and never run
//! together:
//!
//! - [`Capture`](capture::Capture) blocks on many sources at once and
//!   appends `(source_index, event)` records in arrival order.
//! - [`Replay`](replay::Replay) reads the log sequentially, anchors a
//!   clock offset at the first record, sleeps each record's lead time
//!   away, rewrites its timestamp to the emission time, and injects
//!   it into the output device for its source index.
//!
//! The log is the sole interface between the two: a headerless
//! append-only file of fixed-size records whose length implies its
//! record count.
//!
//! # Quick Start
//!
//! ```ignore
//! use evreplay::config::DeviceMap;
//! use evreplay::log::LogReader;
//! use evreplay::replay::Replay;
//! use evreplay::clock::WallClock;
//! use evtap::EvdevSink;
//!
//! let map = DeviceMap::load("devices.toml")?;
//! let mut outputs = Vec::new();
//! for (i, entry) in map.devices.iter().enumerate() {
//!     let sink = EvdevSink::open(map.device_path(i))?;
//!     sink.advertise(&entry.parsed_capabilities()?)?;
//!     outputs.push(sink);
//! }
//!
//! let log = LogReader::open("events.log")?;
//! Replay::new(log, outputs, WallClock).run()?;
//! # Ok::<(), evreplay::Error>(())
//! ```
//!
//! # Failure model
//!
//! Every error is terminal where it is detected (no retry, no
//! partial-record repair) and carries a stable process exit code
//! (see [`Error::exit_code`]). An incomplete recording or replay is
//! useless, so the engine fails fast instead of staying available.

pub mod capture;
pub mod clock;
pub mod config;
pub mod error;
pub mod log;
pub mod replay;
pub mod testing;

// Re-export primary types
pub use capture::{Capture, CaptureSummary};
pub use clock::{Clock, WallClock};
pub use config::{DeviceEntry, DeviceMap};
pub use error::{Error, Result};
pub use log::{LogReader, LogRecord, LogWriter, RECORD_SIZE};
pub use replay::{Replay, ReplaySummary, SLACK};
