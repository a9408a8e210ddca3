//! The event-log format.
//!
//! A log is a headerless, append-only sequence of fixed-size records;
//! each record is a native-order `i32` source index followed by one
//! encoded event payload. There is no record count field and no
//! checksum: the file length implicitly determines the record count,
//! and a length that is not an exact multiple of [`RECORD_SIZE`] is a
//! malformed log.
//!
//! # Torn tail
//!
//! A record is appended as two separate fixed-size writes, index first
//! and payload second. If the index write succeeds and the payload
//! write fails, the log is corrupt at its tail; the session is already
//! fatal at that point and replay of such a log is undefined from the
//! torn record onward. No repair is attempted.

use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use tracing::debug;

use evtap::event::{EVENT_SIZE, InputEvent};

use crate::error::{Error, Result};

/// Size in bytes of one log record: source index plus event payload.
pub const RECORD_SIZE: usize = size_of::<i32>() + EVENT_SIZE;

/// One decoded log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRecord {
    /// Which input source produced the event (0-based, stable for the
    /// recording session).
    pub source: i32,
    /// The event payload, with its original capture timestamp.
    pub event: InputEvent,
}

/// Appends records to an event log, in arrival order.
#[derive(Debug)]
pub struct LogWriter<W: Write> {
    inner: W,
    records: u64,
}

impl LogWriter<File> {
    /// Create (or truncate) a log file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::LogOpen {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "created event log");
        Ok(Self::new(file))
    }
}

impl<W: Write> LogWriter<W> {
    /// Wrap an open, writable destination.
    pub const fn new(inner: W) -> Self {
        Self { inner, records: 0 }
    }

    /// Append one `(source_index, event)` record.
    ///
    /// The index and the payload are written as two separate
    /// fixed-size writes; anything short of full persistence of both
    /// is fatal.
    pub fn append(&mut self, source: i32, event: &InputEvent) -> Result<()> {
        write_exact(&mut self.inner, &source.to_ne_bytes())?;
        write_exact(&mut self.inner, &event.to_bytes())?;
        self.records += 1;
        Ok(())
    }

    /// Number of records appended so far.
    #[must_use]
    pub const fn records(&self) -> u64 {
        self.records
    }

    /// Flush the destination.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(Error::WriteFailed)
    }

    /// Unwrap the destination.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

fn write_exact<W: Write>(writer: &mut W, buf: &[u8]) -> Result<()> {
    let got = writer.write(buf).map_err(Error::WriteFailed)?;
    if got != buf.len() {
        return Err(Error::ShortWrite {
            wanted: buf.len(),
            got,
        });
    }
    Ok(())
}

/// Reads records from an event log, sequentially.
///
/// Construction validates that the log holds a whole number of
/// records, before any record is processed.
#[derive(Debug)]
pub struct LogReader<R: Read> {
    inner: R,
    total: u64,
    next: u64,
}

impl LogReader<File> {
    /// Stat, validate, and open a log file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path).map_err(|source| Error::LogStat {
            path: path.to_path_buf(),
            source,
        })?;
        let file = File::open(path).map_err(|source| Error::LogOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = Self::from_reader(file, meta.len())?;
        debug!(
            path = %path.display(),
            records = reader.record_count(),
            "opened event log"
        );
        Ok(reader)
    }
}

impl<R: Read> LogReader<R> {
    /// Wrap an open, readable log of `byte_len` bytes.
    pub fn from_reader(inner: R, byte_len: u64) -> Result<Self> {
        if byte_len % RECORD_SIZE as u64 != 0 {
            return Err(Error::MalformedLog {
                len: byte_len,
                record_size: RECORD_SIZE,
            });
        }
        Ok(Self {
            inner,
            total: byte_len / RECORD_SIZE as u64,
            next: 0,
        })
    }

    /// Total record count implied by the log length.
    #[must_use]
    pub const fn record_count(&self) -> u64 {
        self.total
    }

    /// Read the next record, or `None` after the last one.
    ///
    /// The index and the payload are read as two fixed-size reads; end
    /// of data partway through either is a truncated log, reported
    /// against the record where it occurred.
    pub fn next_record(&mut self) -> Result<Option<LogRecord>> {
        if self.next == self.total {
            return Ok(None);
        }

        let mut index = [0u8; size_of::<i32>()];
        read_exact(&mut self.inner, &mut index, self.next)?;
        let mut payload = [0u8; EVENT_SIZE];
        read_exact(&mut self.inner, &mut payload, self.next)?;

        let record = LogRecord {
            source: i32::from_ne_bytes(index),
            event: InputEvent::from_bytes(&payload),
        };
        self.next += 1;
        Ok(Some(record))
    }
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], record: u64) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            Error::TruncatedLog { record }
        } else {
            Error::ReadFailed(e)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use evtap::event::EV_KEY;
    use std::io::Cursor;

    fn sample(micros: i64, code: u16) -> InputEvent {
        InputEvent::at_micros(micros, EV_KEY, code, 1)
    }

    #[test]
    fn record_size_is_fixed() {
        assert_eq!(RECORD_SIZE, 28);
    }

    #[test]
    fn writer_reader_round_trip() {
        let mut writer = LogWriter::new(Vec::new());
        writer.append(0, &sample(1_000, 30)).unwrap();
        writer.append(1, &sample(2_000, 31)).unwrap();
        assert_eq!(writer.records(), 2);

        let bytes = writer.into_inner();
        assert_eq!(bytes.len(), 2 * RECORD_SIZE);

        let len = bytes.len() as u64;
        let mut reader = LogReader::from_reader(Cursor::new(bytes), len).unwrap();
        assert_eq!(reader.record_count(), 2);

        let first = reader.next_record().unwrap().unwrap();
        assert_eq!(first.source, 0);
        assert_eq!(first.event, sample(1_000, 30));

        let second = reader.next_record().unwrap().unwrap();
        assert_eq!(second.source, 1);
        assert_eq!(second.event, sample(2_000, 31));

        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn non_multiple_length_is_malformed() {
        let err = LogReader::from_reader(Cursor::new(vec![0u8; 29]), 29).unwrap_err();
        match err {
            Error::MalformedLog { len, record_size } => {
                assert_eq!(len, 29);
                assert_eq!(record_size, RECORD_SIZE);
            }
            other => panic!("expected malformed log, got {other:?}"),
        }
    }

    #[test]
    fn eof_mid_record_is_truncated_at_that_record() {
        let mut writer = LogWriter::new(Vec::new());
        writer.append(0, &sample(1_000, 30)).unwrap();
        let mut bytes = writer.into_inner();
        // Second record: index present, payload cut short
        bytes.extend_from_slice(&1i32.to_ne_bytes());
        bytes.extend_from_slice(&[0u8; 10]);

        let declared = (2 * RECORD_SIZE) as u64;
        let mut reader = LogReader::from_reader(Cursor::new(bytes), declared).unwrap();

        // First record is intact
        assert!(reader.next_record().unwrap().is_some());

        // Second tears exactly at record 1, and nothing follows
        match reader.next_record() {
            Err(Error::TruncatedLog { record: 1 }) => {}
            other => panic!("expected truncation at record 1, got {other:?}"),
        }
    }

    #[test]
    fn short_write_is_fatal() {
        struct Half;
        impl Write for Half {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                Ok(buf.len() / 2)
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = LogWriter::new(Half);
        match writer.append(0, &sample(0, 30)) {
            Err(Error::ShortWrite { wanted, got }) => {
                assert_eq!(wanted, size_of::<i32>());
                assert_eq!(got, size_of::<i32>() / 2);
            }
            other => panic!("expected short write, got {other:?}"),
        }
    }

    #[test]
    fn index_uses_native_byte_order() {
        let mut writer = LogWriter::new(Vec::new());
        writer.append(7, &sample(0, 30)).unwrap();
        let bytes = writer.into_inner();
        assert_eq!(&bytes[0..4], &7i32.to_ne_bytes());
    }
}
