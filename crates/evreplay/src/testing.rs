//! Deterministic fakes for exercising the engine without devices.
//!
//! The capture multiplexer and replay scheduler are generic over
//! [`EventSource`], [`Readiness`], [`EventSink`], and
//! [`crate::clock::Clock`]; the types here implement those seams with
//! scripted, inspectable behavior so unit and integration tests can
//! run without device nodes, real time, or real sleeping.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use evtap::error::{Result as TapResult, TapError};
use evtap::event::{EVENT_SIZE, InputEvent};
use evtap::traits::{EventSink, EventSource, Readiness};

use crate::clock::Clock;

/// An event source fed from a queue.
///
/// Reading past the queue behaves like a device that signaled
/// readiness but delivered nothing: a zero-byte short read.
#[derive(Debug, Default)]
pub struct FakeSource {
    queue: VecDeque<InputEvent>,
}

impl FakeSource {
    /// A source that will deliver `events` in order.
    #[must_use]
    pub fn new(events: Vec<InputEvent>) -> Self {
        Self {
            queue: events.into(),
        }
    }

    /// Queue another event.
    pub fn push(&mut self, event: InputEvent) {
        self.queue.push_back(event);
    }
}

impl EventSource for FakeSource {
    fn read_event(&mut self) -> TapResult<InputEvent> {
        self.queue.pop_front().ok_or(TapError::ShortRead {
            wanted: EVENT_SIZE,
            got: 0,
        })
    }
}

/// A readiness poller that replays a fixed script of wait cycles.
///
/// Each call to [`Readiness::wait`] pops the next scripted ready set.
/// When the script runs out, the poller raises the shared stop flag
/// and reports nothing ready, so a capture loop sharing the flag
/// terminates cleanly instead of blocking forever.
#[derive(Debug)]
pub struct ScriptedPoller {
    cycles: VecDeque<Vec<usize>>,
    stop: Arc<AtomicBool>,
}

impl ScriptedPoller {
    /// A poller that reports `cycles` in order, then stops the session.
    #[must_use]
    pub fn new(cycles: Vec<Vec<usize>>, stop: Arc<AtomicBool>) -> Self {
        Self {
            cycles: cycles.into(),
            stop,
        }
    }
}

impl Readiness for ScriptedPoller {
    fn wait(&mut self) -> TapResult<Vec<usize>> {
        self.cycles.pop_front().map_or_else(
            || {
                self.stop.store(true, Ordering::Relaxed);
                Ok(Vec::new())
            },
            |mut ready| {
                ready.sort_unstable();
                Ok(ready)
            },
        )
    }
}

/// An event sink that collects everything written to it.
///
/// Clones share the same underlying store, so a test can keep a handle
/// while the scheduler owns the sink.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<InputEvent>>>,
}

impl MemorySink {
    /// Snapshot of the events written so far.
    #[must_use]
    pub fn events(&self) -> Vec<InputEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl EventSink for MemorySink {
    fn write_event(&mut self, event: &InputEvent) -> TapResult<()> {
        if let Ok(mut events) = self.events.lock() {
            events.push(*event);
        }
        Ok(())
    }
}

/// A sink whose writes always fail, for fatal-path tests.
#[derive(Debug, Default)]
pub struct FailingSink;

impl EventSink for FailingSink {
    fn write_event(&mut self, _event: &InputEvent) -> TapResult<()> {
        Err(TapError::ShortWrite {
            wanted: EVENT_SIZE,
            got: 0,
        })
    }
}

#[derive(Debug)]
struct ManualClockState {
    now_micros: i64,
    sleeps: Vec<Duration>,
}

/// A virtual clock for deterministic scheduler tests.
///
/// Time only moves when the scheduler sleeps or the test advances it
/// explicitly; every sleep is recorded. Clones share the same state,
/// so a test keeps a handle while the scheduler owns the clock.
#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ManualClockState>>,
}

impl ManualClock {
    /// A clock whose "wall time" starts at `micros`.
    #[must_use]
    pub fn starting_at(micros: i64) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualClockState {
                now_micros: micros,
                sleeps: Vec::new(),
            })),
        }
    }

    /// Jump time forward without recording a sleep, simulating a
    /// process stall between records.
    pub fn advance(&self, duration: Duration) {
        if let Ok(mut state) = self.state.lock() {
            state.now_micros += duration.as_micros() as i64;
        }
    }

    /// Every sleep the scheduler has performed, in order.
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.state
            .lock()
            .map(|s| s.sleeps.clone())
            .unwrap_or_default()
    }
}

impl Clock for ManualClock {
    fn now_micros(&mut self) -> i64 {
        self.state.lock().map(|s| s.now_micros).unwrap_or(0)
    }

    fn sleep(&mut self, duration: Duration) {
        if let Ok(mut state) = self.state.lock() {
            state.now_micros += duration.as_micros() as i64;
            state.sleeps.push(duration);
        }
    }
}
