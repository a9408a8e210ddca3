//! The clock seam for the replay scheduler.
//!
//! The scheduler only ever asks "what time is it" and "sleep this
//! long", so both are behind a trait: [`WallClock`] for live replay,
//! and a manual clock (see [`crate::testing`]) for deterministic
//! tests.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A source of wall time and suspension.
pub trait Clock {
    /// Current wall time as signed microseconds since the epoch.
    fn now_micros(&mut self) -> i64;

    /// Suspend execution for exactly `duration`.
    fn sleep(&mut self, duration: Duration);
}

/// The live wall clock.
///
/// Capture timestamps come from the kernel's realtime clock, so
/// replay anchors against the same clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn now_micros(&mut self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => since.as_micros() as i64,
            // Clock set before the epoch; keep the arithmetic signed
            Err(err) => -(err.duration().as_micros() as i64),
        }
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_clock_is_monotonic_enough() {
        let mut clock = WallClock;
        let a = clock.now_micros();
        let b = clock.now_micros();
        assert!(b >= a);
        assert!(a > 0);
    }
}
