//! Input and output device handles.
//!
//! [`EvdevSource`] wraps a readable `/dev/input` node and delivers one
//! fixed-size event per read. [`EvdevSink`] wraps a writable node and
//! injects events after advertising the event categories it will emit.
//!
//! Both handles are opened non-blocking: sources are only read after a
//! readiness wait reports data available, and sinks accept single
//! event-sized writes.

use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd};
use std::path::{Path, PathBuf};

use rustix::fs::{Mode, OFlags, open};
use tracing::{debug, trace};

use crate::caps::Capability;
use crate::error::{Result, TapError};
use crate::event::{EVENT_SIZE, InputEvent};
use crate::traits::{EventSink, EventSource};

/// A readable input-device handle.
#[derive(Debug)]
pub struct EvdevSource {
    fd: OwnedFd,
    path: PathBuf,
}

impl EvdevSource {
    /// Open an input device node for reading.
    ///
    /// The node is opened `O_RDONLY | O_NONBLOCK`; reads are expected
    /// to follow a readiness wait.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let fd = open(
            path,
            OFlags::RDONLY | OFlags::NONBLOCK | OFlags::CLOEXEC,
            Mode::empty(),
        )
        .map_err(|e| TapError::Open {
            path: path.to_path_buf(),
            source: io::Error::from_raw_os_error(e.raw_os_error()),
        })?;

        debug!(path = %path.display(), fd = fd.as_raw_fd(), "opened input source");
        Ok(Self {
            fd,
            path: path.to_path_buf(),
        })
    }

    /// Wrap an already-open readable descriptor.
    ///
    /// Used by tests that substitute a pipe for a device node.
    #[must_use]
    pub fn from_fd(fd: OwnedFd) -> Self {
        Self {
            fd,
            path: PathBuf::from("<fd>"),
        }
    }

    /// Path this source was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsFd for EvdevSource {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl EventSource for EvdevSource {
    fn read_event(&mut self) -> Result<InputEvent> {
        let mut buf = [0u8; EVENT_SIZE];
        let got = rustix::io::read(&self.fd, &mut buf)?;
        if got != EVENT_SIZE {
            return Err(TapError::ShortRead {
                wanted: EVENT_SIZE,
                got,
            });
        }
        let event = InputEvent::from_bytes(&buf);
        trace!(
            path = %self.path.display(),
            kind = event.kind,
            code = event.code,
            value = event.value,
            "read event"
        );
        Ok(event)
    }
}

/// A writable output-device handle.
///
/// Events are injected with their type/code/value untouched; the
/// caller is responsible for rewriting timestamps first. A sink that
/// never advertised the category of an incoming event has undefined
/// behavior at the kernel/driver boundary; this layer does not detect
/// or filter such writes.
#[derive(Debug)]
pub struct EvdevSink {
    fd: OwnedFd,
    path: PathBuf,
}

impl EvdevSink {
    /// Open an output device node for writing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let fd = open(
            path,
            OFlags::WRONLY | OFlags::NONBLOCK | OFlags::CLOEXEC,
            Mode::empty(),
        )
        .map_err(|e| TapError::Open {
            path: path.to_path_buf(),
            source: io::Error::from_raw_os_error(e.raw_os_error()),
        })?;

        debug!(path = %path.display(), fd = fd.as_raw_fd(), "opened output device");
        Ok(Self {
            fd,
            path: path.to_path_buf(),
        })
    }

    /// Wrap an already-open writable descriptor.
    ///
    /// Used by tests that substitute a pipe for a device node.
    #[must_use]
    pub fn from_fd(fd: OwnedFd) -> Self {
        Self {
            fd,
            path: PathBuf::from("<fd>"),
        }
    }

    /// Path this sink was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Advertise the event categories this device will emit.
    ///
    /// Must be called before the first [`EventSink::write_event`];
    /// drivers may drop or mangle events of unadvertised categories.
    pub fn advertise(&self, capabilities: &[Capability]) -> Result<()> {
        for &capability in capabilities {
            set_ev_bit(self.fd.as_fd(), capability.ev_bit()).map_err(|source| {
                TapError::Capability {
                    path: self.path.clone(),
                    capability,
                    source,
                }
            })?;
            debug!(path = %self.path.display(), %capability, "advertised capability");
        }
        Ok(())
    }
}

impl AsFd for EvdevSink {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl EventSink for EvdevSink {
    fn write_event(&mut self, event: &InputEvent) -> Result<()> {
        let buf = event.to_bytes();
        let got = rustix::io::write(&self.fd, &buf)?;
        if got != EVENT_SIZE {
            return Err(TapError::ShortWrite {
                wanted: EVENT_SIZE,
                got,
            });
        }
        trace!(
            path = %self.path.display(),
            kind = event.kind,
            code = event.code,
            value = event.value,
            "wrote event"
        );
        Ok(())
    }
}

/// `UI_SET_EVBIT`: `_IOW('U', 100, int)`.
const UI_SET_EVBIT: libc::c_ulong = 0x4004_5564;

#[allow(unsafe_code)]
fn set_ev_bit(fd: BorrowedFd<'_>, bit: u16) -> io::Result<()> {
    // SAFETY: UI_SET_EVBIT takes its int argument by value; no memory
    // is borrowed across the call.
    let rc = unsafe { libc::ioctl(fd.as_raw_fd(), UI_SET_EVBIT, libc::c_int::from(bit)) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
