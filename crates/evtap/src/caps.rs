//! Output-device capability advertising.
//!
//! Before any event is injected, an output device must advertise which
//! event categories it will emit. The mapping from device to
//! capability set is supplied as configuration, never inferred from a
//! device's position in a list.

use std::fmt;
use std::str::FromStr;

use crate::event::{EV_ABS, EV_KEY, EV_REL, EV_REP};

/// An event category an output device can advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Key and button events (`EV_KEY`).
    Key,
    /// Relative motion events (`EV_REL`).
    Relative,
    /// Absolute motion events such as touch (`EV_ABS`).
    Absolute,
    /// Autorepeat events (`EV_REP`).
    Repeat,
}

impl Capability {
    /// The `EV_*` event-type bit this capability advertises.
    #[must_use]
    pub const fn ev_bit(self) -> u16 {
        match self {
            Self::Key => EV_KEY,
            Self::Relative => EV_REL,
            Self::Absolute => EV_ABS,
            Self::Repeat => EV_REP,
        }
    }

    /// The configuration-file spelling of this capability.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Relative => "rel",
            Self::Absolute => "abs",
            Self::Repeat => "rep",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a capability name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown capability '{0}' (expected key, rel, abs, or rep)")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "key" => Ok(Self::Key),
            "rel" => Ok(Self::Relative),
            "abs" => Ok(Self::Absolute),
            "rep" => Ok(Self::Repeat),
            other => Err(UnknownCapability(other.to_string())),
        }
    }
}
