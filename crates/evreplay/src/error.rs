//! Error types for the evreplay engine.
//!
//! Every error is terminal at the point of detection: there is no
//! retry, no partial-record skip, and no log repair. An incomplete
//! recording or replay is useless, so the engine favors fail-fast
//! correctness over availability. Each failure class maps to a
//! distinct, stable process exit code via [`Error::exit_code`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use evtap::TapError;
use evtap::caps::UnknownCapability;

/// The main error type for capture and replay operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to open a device node.
    #[error("failed to open device {path}: {source}")]
    DeviceOpen {
        /// Path of the device node.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to advertise a capability on an output device.
    #[error("failed to set up device capabilities: {0}")]
    Capability(#[source] TapError),

    /// Failed to open the event log.
    #[error("failed to open log {path}: {source}")]
    LogOpen {
        /// Path of the log file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to stat the event log.
    #[error("failed to stat log {path}: {source}")]
    LogStat {
        /// Path of the log file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The log length is not a whole number of records.
    #[error("malformed log: {len} bytes is not a multiple of the {record_size}-byte record size")]
    MalformedLog {
        /// Byte length of the log.
        len: u64,
        /// The fixed record size.
        record_size: usize,
    },

    /// A source delivered fewer bytes than one complete event.
    #[error("short read from source: got {got} of {wanted} bytes")]
    ShortRead {
        /// Bytes expected.
        wanted: usize,
        /// Bytes actually read.
        got: usize,
    },

    /// The log ended partway through a record.
    #[error("truncated log: record {record} ends mid-record")]
    TruncatedLog {
        /// Zero-based index of the torn record.
        record: u64,
    },

    /// A read failed outright at the OS level.
    #[error("read failed: {0}")]
    ReadFailed(#[source] io::Error),

    /// The log or an output device accepted fewer bytes than requested.
    #[error("short write: wrote {got} of {wanted} bytes")]
    ShortWrite {
        /// Bytes expected.
        wanted: usize,
        /// Bytes actually written.
        got: usize,
    },

    /// A write failed outright at the OS level.
    #[error("write failed: {0}")]
    WriteFailed(#[source] io::Error),

    /// A record names a source index with no configured output device.
    #[error("record {record} names source {index}, but only {outputs} outputs are configured")]
    UnknownSource {
        /// Zero-based index of the offending record.
        record: u64,
        /// The source index the record carries.
        index: i32,
        /// Number of configured outputs.
        outputs: usize,
    },

    /// The readiness wait primitive failed.
    #[error("readiness wait failed: {0}")]
    Wait(#[source] io::Error),

    /// The device-map configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Any other I/O error.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// The stable process exit code for this failure class.
    ///
    /// ```text
    /// 0  success                       6  malformed log / unknown source
    /// 2  usage (reserved for the CLI)  7  read error
    /// 3  device open / capability      8  write error
    /// 4  log open                      9  wait-primitive failure
    /// 5  log stat                     10  configuration error
    ///                                  1  other I/O
    /// ```
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::DeviceOpen { .. } | Self::Capability(_) => 3,
            Self::LogOpen { .. } => 4,
            Self::LogStat { .. } => 5,
            Self::MalformedLog { .. } | Self::UnknownSource { .. } => 6,
            Self::ShortRead { .. } | Self::TruncatedLog { .. } | Self::ReadFailed(_) => 7,
            Self::ShortWrite { .. } | Self::WriteFailed(_) => 8,
            Self::Wait(_) => 9,
            Self::Config(_) => 10,
            Self::Io(_) => 1,
        }
    }
}

impl From<TapError> for Error {
    fn from(err: TapError) -> Self {
        match err {
            TapError::Open { path, source } => Self::DeviceOpen { path, source },
            TapError::Capability { .. } => Self::Capability(err),
            TapError::ShortRead { wanted, got } => Self::ShortRead { wanted, got },
            TapError::ShortWrite { wanted, got } => Self::ShortWrite { wanted, got },
            TapError::Wait(source) => Self::Wait(source),
            TapError::Io(source) => Self::Io(source),
        }
    }
}

impl From<UnknownCapability> for Error {
    fn from(err: UnknownCapability) -> Self {
        Self::Config(err.to_string())
    }
}

/// A specialized Result type for capture and replay operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_stable() {
        let not_found = || io::Error::new(io::ErrorKind::NotFound, "gone");
        let cases: Vec<(Error, i32)> = vec![
            (
                Error::DeviceOpen {
                    path: PathBuf::from("/dev/input/event0"),
                    source: not_found(),
                },
                3,
            ),
            (
                Error::LogOpen {
                    path: PathBuf::from("events.log"),
                    source: not_found(),
                },
                4,
            ),
            (
                Error::LogStat {
                    path: PathBuf::from("events.log"),
                    source: not_found(),
                },
                5,
            ),
            (
                Error::MalformedLog {
                    len: 29,
                    record_size: 28,
                },
                6,
            ),
            (Error::ShortRead { wanted: 24, got: 3 }, 7),
            (Error::TruncatedLog { record: 9 }, 7),
            (Error::ReadFailed(not_found()), 7),
            (Error::ShortWrite { wanted: 24, got: 0 }, 8),
            (Error::WriteFailed(not_found()), 8),
            (Error::Wait(not_found()), 9),
            (Error::Config("bad".into()), 10),
            (Error::Io(not_found()), 1),
        ];

        for (err, code) in cases {
            assert_eq!(err.exit_code(), code, "{err}");
        }
    }

    #[test]
    fn tap_short_read_maps_to_read_class() {
        let err: Error = TapError::ShortRead { wanted: 24, got: 1 }.into();
        assert!(matches!(err, Error::ShortRead { .. }));
        assert_eq!(err.exit_code(), 7);
    }

    #[test]
    fn tap_open_maps_to_device_open() {
        let err: Error = TapError::Open {
            path: PathBuf::from("/dev/input/event3"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert_eq!(err.exit_code(), 3);
    }
}
