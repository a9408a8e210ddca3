//! The fixed-layout input event payload.
//!
//! [`InputEvent`] mirrors the 64-bit Linux `input_event` wire format:
//! a 16-byte capture timestamp (seconds + microseconds) followed by a
//! type, a code, and a value. The layout is defined with explicit
//! field widths and encoded field-by-field in native byte order, so
//! the binary size is stable across the capture/replay boundary
//! without relying on in-memory struct layout.

/// Size in bytes of one encoded event payload.
pub const EVENT_SIZE: usize = 24;

/// Event type for synchronization markers (`EV_SYN`).
pub const EV_SYN: u16 = 0x00;
/// Event type for key and button events (`EV_KEY`).
pub const EV_KEY: u16 = 0x01;
/// Event type for relative motion (`EV_REL`).
pub const EV_REL: u16 = 0x02;
/// Event type for absolute motion such as touch (`EV_ABS`).
pub const EV_ABS: u16 = 0x03;
/// Event type for autorepeat configuration (`EV_REP`).
pub const EV_REP: u16 = 0x14;

/// One kernel input event.
///
/// The timestamp is the producing device's capture time, not wall time
/// at log-write time; the replay scheduler rewrites it to the computed
/// emission time before injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    /// Capture time, whole seconds since the epoch.
    pub sec: i64,
    /// Capture time, microseconds within the second.
    pub usec: i64,
    /// Event type (`EV_KEY`, `EV_ABS`, ...).
    pub kind: u16,
    /// Event code within the type.
    pub code: u16,
    /// Event value.
    pub value: i32,
}

impl InputEvent {
    /// Create an event with an explicit capture time in microseconds.
    #[must_use]
    pub fn at_micros(micros: i64, kind: u16, code: u16, value: i32) -> Self {
        Self {
            sec: micros.div_euclid(1_000_000),
            usec: micros.rem_euclid(1_000_000),
            kind,
            code,
            value,
        }
    }

    /// Capture time as signed microseconds since the epoch.
    #[must_use]
    pub const fn time_micros(&self) -> i64 {
        self.sec * 1_000_000 + self.usec
    }

    /// Overwrite the embedded timestamp from signed microseconds.
    pub fn set_time_micros(&mut self, micros: i64) {
        self.sec = micros.div_euclid(1_000_000);
        self.usec = micros.rem_euclid(1_000_000);
    }

    /// Encode the event into its fixed wire layout, native byte order.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; EVENT_SIZE] {
        let mut buf = [0u8; EVENT_SIZE];
        buf[0..8].copy_from_slice(&self.sec.to_ne_bytes());
        buf[8..16].copy_from_slice(&self.usec.to_ne_bytes());
        buf[16..18].copy_from_slice(&self.kind.to_ne_bytes());
        buf[18..20].copy_from_slice(&self.code.to_ne_bytes());
        buf[20..24].copy_from_slice(&self.value.to_ne_bytes());
        buf
    }

    /// Decode an event from its fixed wire layout, native byte order.
    #[must_use]
    pub fn from_bytes(buf: &[u8; EVENT_SIZE]) -> Self {
        let mut sec = [0u8; 8];
        let mut usec = [0u8; 8];
        let mut kind = [0u8; 2];
        let mut code = [0u8; 2];
        let mut value = [0u8; 4];
        sec.copy_from_slice(&buf[0..8]);
        usec.copy_from_slice(&buf[8..16]);
        kind.copy_from_slice(&buf[16..18]);
        code.copy_from_slice(&buf[18..20]);
        value.copy_from_slice(&buf[20..24]);
        Self {
            sec: i64::from_ne_bytes(sec),
            usec: i64::from_ne_bytes(usec),
            kind: u16::from_ne_bytes(kind),
            code: u16::from_ne_bytes(code),
            value: i32::from_ne_bytes(value),
        }
    }
}
