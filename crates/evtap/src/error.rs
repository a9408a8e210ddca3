//! Error types for the evtap crate.
//!
//! This module provides a unified error type [`TapError`] that covers all
//! failure modes when opening, reading, writing, or polling input devices.

use std::io;
use std::path::PathBuf;

/// The error type for device-tap operations.
///
/// Every failure is terminal at the point of detection: an incomplete
/// event stream is useless, so nothing here is retried or repaired.
#[derive(Debug, thiserror::Error)]
pub enum TapError {
    /// Failed to open a device node.
    #[error("failed to open device {path}: {source}")]
    Open {
        /// Path of the device node.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to advertise a capability on an output device.
    #[error("failed to advertise {capability} on device {path}: {source}")]
    Capability {
        /// Path of the device node.
        path: PathBuf,
        /// The capability being advertised.
        capability: crate::caps::Capability,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A device delivered fewer bytes than one complete event.
    #[error("short read: got {got} of {wanted} event bytes")]
    ShortRead {
        /// Bytes expected.
        wanted: usize,
        /// Bytes actually read.
        got: usize,
    },

    /// A device accepted fewer bytes than one complete event.
    #[error("short write: wrote {got} of {wanted} event bytes")]
    ShortWrite {
        /// Bytes expected.
        wanted: usize,
        /// Bytes actually written.
        got: usize,
    },

    /// The readiness wait primitive failed.
    #[error("readiness wait failed: {0}")]
    Wait(#[source] io::Error),

    /// An I/O error occurred during device operations.
    #[error("device I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A specialized Result type for device-tap operations.
pub type Result<T> = std::result::Result<T, TapError>;

#[cfg(unix)]
impl From<rustix::io::Errno> for TapError {
    fn from(errno: rustix::io::Errno) -> Self {
        Self::Io(io::Error::from_raw_os_error(errno.raw_os_error()))
    }
}
