//! evtap: Linux input-device event tap library
//!
//! This crate provides the low-level device layer for recording and
//! injecting kernel input events:
//!
//! - A fixed-layout [`InputEvent`] payload matching the 64-bit Linux
//!   `input_event` wire format
//! - [`EvdevSource`] / [`EvdevSink`] handles over `/dev/input` nodes
//! - [`Capability`] advertising for output devices (uinput `UI_SET_EVBIT`)
//! - An [`FdPoller`] readiness poller that blocks on many sources at once
//!
//! # Platform Support
//!
//! The device handles target Linux evdev/uinput nodes. The payload
//! layout and the trait seams ([`EventSource`], [`EventSink`],
//! [`Readiness`]) are platform-neutral so engines built on top of them
//! can be tested with fakes on any Unix.
//!
//! # Quick Start
//!
//! ```ignore
//! use evtap::{EvdevSource, EventSource, FdPoller, Readiness};
//!
//! let mut sources = vec![EvdevSource::open("/dev/input/event0")?];
//! let mut poller = FdPoller::new(&sources)?;
//!
//! let ready = poller.wait()?;
//! for index in ready {
//!     let event = sources[index].read_event()?;
//!     println!("source {index}: type {} code {}", event.kind, event.code);
//! }
//! # Ok::<(), evtap::TapError>(())
//! ```

pub mod caps;
pub mod error;
pub mod event;
pub mod traits;

#[cfg(unix)]
pub mod device;

#[cfg(unix)]
pub mod poll;

// Re-export primary types
pub use caps::Capability;
pub use error::{Result, TapError};
pub use event::{EVENT_SIZE, InputEvent};
pub use traits::{EventSink, EventSource, Readiness};

// Platform-specific re-exports
#[cfg(unix)]
pub use device::{EvdevSink, EvdevSource};

#[cfg(unix)]
pub use poll::FdPoller;
