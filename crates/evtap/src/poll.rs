//! Multi-source readiness polling.
//!
//! [`FdPoller`] is an owned readiness poller: it is constructed from
//! the set of source handles it watches and carries its own duplicated
//! descriptors, so there is no process-wide descriptor table and no
//! hidden shared state. One poller instance belongs to one capture
//! session.

use std::io;
use std::os::fd::{AsFd, OwnedFd};

use rustix::event::{PollFd, PollFlags, poll};
use rustix::io::Errno;
use tracing::trace;

use crate::error::{Result, TapError};
use crate::traits::Readiness;

/// A blocking poller over a fixed set of source descriptors.
///
/// The wait is unbounded and reports readiness independently per
/// source: two sources becoming ready in the same cycle are both
/// reported, in ascending index order, so the caller drains both
/// before the next wait. Cross-source ordering is therefore an
/// approximation of true hardware arrival order, bounded by the wait
/// primitive's granularity.
#[derive(Debug)]
pub struct FdPoller {
    fds: Vec<OwnedFd>,
}

impl FdPoller {
    /// Build a poller watching the given handles, in order.
    ///
    /// Each handle's descriptor is duplicated, so the poller's indices
    /// stay stable for the session regardless of what the caller does
    /// with the original handles.
    pub fn new<F: AsFd>(handles: impl IntoIterator<Item = F>) -> Result<Self> {
        let mut fds = Vec::new();
        for handle in handles {
            fds.push(rustix::io::dup(handle)?);
        }
        Ok(Self { fds })
    }

    /// Number of watched sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fds.len()
    }

    /// Whether the poller watches no sources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fds.is_empty()
    }
}

impl Readiness for FdPoller {
    fn wait(&mut self) -> Result<Vec<usize>> {
        let mut pollfds: Vec<PollFd<'_>> = self
            .fds
            .iter()
            .map(|fd| PollFd::new(fd, PollFlags::IN))
            .collect();

        match poll(&mut pollfds, None) {
            Ok(_) => {}
            // A signal landed mid-wait; report nothing so the caller
            // can observe its stop flag and wait again.
            Err(Errno::INTR) => return Ok(Vec::new()),
            Err(e) => {
                return Err(TapError::Wait(io::Error::from_raw_os_error(
                    e.raw_os_error(),
                )));
            }
        }

        let ready: Vec<usize> = pollfds
            .iter()
            .enumerate()
            .filter(|(_, p)| p.revents().contains(PollFlags::IN))
            .map(|(index, _)| index)
            .collect();
        trace!(?ready, "readiness wait returned");
        Ok(ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_ready_source_is_reported() {
        let (read_a, _write_a) = rustix::pipe::pipe().expect("pipe");
        let (read_b, write_b) = rustix::pipe::pipe().expect("pipe");
        let mut poller = FdPoller::new([&read_a, &read_b]).unwrap();

        rustix::io::write(&write_b, b"x").unwrap();

        assert_eq!(poller.wait().unwrap(), vec![1]);
    }

    #[test]
    fn simultaneous_readiness_reports_ascending_indices() {
        let (read_a, write_a) = rustix::pipe::pipe().expect("pipe");
        let (read_b, write_b) = rustix::pipe::pipe().expect("pipe");
        let mut poller = FdPoller::new([&read_a, &read_b]).unwrap();

        rustix::io::write(&write_b, b"x").unwrap();
        rustix::io::write(&write_a, b"y").unwrap();

        assert_eq!(poller.wait().unwrap(), vec![0, 1]);
    }

    #[test]
    fn poller_survives_original_handle_drop() {
        let (read, write) = rustix::pipe::pipe().expect("pipe");
        let mut poller = FdPoller::new([&read]).unwrap();
        drop(read);

        rustix::io::write(&write, b"x").unwrap();
        assert_eq!(poller.wait().unwrap(), vec![0]);
    }
}
