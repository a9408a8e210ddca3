//! Trait seams between device handles and the engines built on them.
//!
//! The capture multiplexer and replay scheduler are written against
//! these traits so they can be exercised with fake sources, sinks, and
//! pollers instead of live device nodes.

use crate::error::Result;
use crate::event::InputEvent;

/// A handle that delivers a stream of fixed-size input events.
pub trait EventSource {
    /// Read exactly one event.
    ///
    /// Anything other than one complete event payload is a short read,
    /// which is fatal to the session: there is no partial-record
    /// recovery.
    fn read_event(&mut self) -> Result<InputEvent>;
}

/// A handle that accepts injected input events.
pub trait EventSink {
    /// Write exactly one event.
    ///
    /// Anything other than one complete event payload accepted is a
    /// short write, which is fatal to the session.
    fn write_event(&mut self, event: &InputEvent) -> Result<()>;
}

/// A blocking multi-source readiness wait.
///
/// Implementations watch a fixed set of sources and block, with an
/// unbounded timeout, until at least one has data available, without
/// polling in a busy loop.
pub trait Readiness {
    /// Block until at least one watched source is ready.
    ///
    /// Returns the ready source indices in ascending order, so a
    /// caller draining them observes a fixed, deterministic order
    /// within one wait cycle. An empty set is permitted (the wait was
    /// interrupted); callers should re-check their stop condition and
    /// wait again.
    fn wait(&mut self) -> Result<Vec<usize>>;
}
