//! The replay scheduler.
//!
//! Reads a validated event log sequentially and reproduces, against
//! live output devices, the relative inter-event timing observed
//! during capture, anchored to a single clock offset established at
//! the first record.
//!
//! # Burst on stall
//!
//! The offset is computed once and never re-anchored. If the replaying
//! process stalls mid-session (an OS scheduling hiccup, say), the
//! overdue records still target `capture_time + offset` and are
//! emitted back-to-back until the schedule is caught up. That is the
//! recorded behavior being reproduced faithfully; the test suite pins
//! it as a characteristic rather than smoothing it away.

use std::io::Read;
use std::time::Duration;

use tracing::{debug, trace};

use evtap::traits::EventSink;

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::log::LogReader;

/// Scheduling slack below which a record is emitted immediately.
///
/// Sub-hundred-microsecond lead time is treated as "now"; the
/// scheduler never sleeps a zero or negative duration.
pub const SLACK: Duration = Duration::from_micros(100);

/// Totals for a finished replay session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Records emitted.
    pub records: u64,
}

/// Replays a log against output sinks with reconstructed timing.
///
/// Runs single-threaded; the only suspension point is the computed
/// sleep before each emission. Any read, write, or indexing failure
/// is fatal and aborts the session immediately.
#[derive(Debug)]
pub struct Replay<R, K, C>
where
    R: Read,
    K: EventSink,
    C: Clock,
{
    log: LogReader<R>,
    outputs: Vec<K>,
    clock: C,
    offset_micros: Option<i64>,
    emitted: u64,
}

impl<R, K, C> Replay<R, K, C>
where
    R: Read,
    K: EventSink,
    C: Clock,
{
    /// Build a replay session over a validated log.
    ///
    /// `outputs[i]` receives the events recorded from source index
    /// `i`; a record naming an index outside `outputs` is an error.
    pub const fn new(log: LogReader<R>, outputs: Vec<K>, clock: C) -> Self {
        Self {
            log,
            outputs,
            clock,
            offset_micros: None,
            emitted: 0,
        }
    }

    /// The clock offset fixed at the first record, if established.
    #[must_use]
    pub const fn offset_micros(&self) -> Option<i64> {
        self.offset_micros
    }

    /// Records emitted so far.
    #[must_use]
    pub const fn emitted(&self) -> u64 {
        self.emitted
    }

    /// The output sinks, indexed by source index.
    #[must_use]
    pub fn outputs(&self) -> &[K] {
        &self.outputs
    }

    /// The session clock.
    pub const fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Process one record: wait out its lead time, rewrite its
    /// timestamp to the target emission time, and inject it.
    ///
    /// Returns `Ok(None)` after the last record.
    pub fn step(&mut self) -> Result<Option<()>> {
        let Some(mut record) = self.log.next_record()? else {
            return Ok(None);
        };

        let now = self.clock.now_micros();
        let capture = record.event.time_micros();
        // The offset is anchored exactly once, at the first record
        let offset = *self.offset_micros.get_or_insert_with(|| {
            let offset = now - capture;
            debug!(offset_micros = offset, "clock offset anchored");
            offset
        });

        let target = capture + offset;
        let lead = target - now;
        if lead > SLACK.as_micros() as i64 {
            self.clock.sleep(Duration::from_micros(lead as u64));
        }

        // The consumer observes timestamps consistent with emission
        // time, not the original capture time
        record.event.set_time_micros(target);

        let record_no = self.emitted;
        let outputs = self.outputs.len();
        let sink = usize::try_from(record.source)
            .ok()
            .and_then(|i| self.outputs.get_mut(i))
            .ok_or(Error::UnknownSource {
                record: record_no,
                index: record.source,
                outputs,
            })?;
        sink.write_event(&record.event)?;

        trace!(
            source = record.source,
            target_micros = target,
            kind = record.event.kind,
            code = record.event.code,
            "emitted event"
        );
        self.emitted += 1;
        Ok(Some(()))
    }

    /// Replay every record in order.
    pub fn run(&mut self) -> Result<ReplaySummary> {
        debug!(
            records = self.log.record_count(),
            outputs = self.outputs.len(),
            "replay session started"
        );
        while self.step()?.is_some() {}
        let summary = ReplaySummary {
            records: self.emitted,
        };
        debug!(records = summary.records, "replay session finished");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::LogWriter;
    use crate::testing::{ManualClock, MemorySink};
    use evtap::event::{EV_KEY, InputEvent};
    use std::io::Cursor;

    fn log_of(records: &[(i32, i64)]) -> LogReader<Cursor<Vec<u8>>> {
        let mut writer = LogWriter::new(Vec::new());
        for &(source, micros) in records {
            writer
                .append(source, &InputEvent::at_micros(micros, EV_KEY, 30, 1))
                .unwrap();
        }
        let bytes = writer.into_inner();
        let len = bytes.len() as u64;
        LogReader::from_reader(Cursor::new(bytes), len).unwrap()
    }

    #[test]
    fn offset_is_anchored_once_and_targets_follow_it() {
        // Capture times: t, t+50ms, t+120ms
        let log = log_of(&[(0, 1_000_000), (0, 1_050_000), (0, 1_120_000)]);
        let clock = ManualClock::starting_at(500_000_000);
        let sink = MemorySink::default();
        let mut replay = Replay::new(log, vec![sink.clone()], clock.clone());

        replay.run().unwrap();

        let offset = replay.offset_micros().unwrap();
        assert_eq!(offset, 500_000_000 - 1_000_000);

        let emitted: Vec<i64> = sink.events().iter().map(|e| e.time_micros()).collect();
        assert_eq!(
            emitted,
            vec![500_000_000, 500_050_000, 500_120_000],
            "target emission time must equal capture time + offset for every record"
        );
        // Relative spacing matches capture spacing exactly
        assert_eq!(clock.sleeps(), vec![
            Duration::from_micros(50_000),
            Duration::from_micros(70_000),
        ]);
    }

    #[test]
    fn sub_slack_lead_time_does_not_sleep() {
        // 80µs apart: inside the 100µs slack
        let log = log_of(&[(0, 1_000), (0, 1_080)]);
        let clock = ManualClock::starting_at(10_000);
        let sink = MemorySink::default();
        let mut replay = Replay::new(log, vec![sink.clone()], clock.clone());

        replay.run().unwrap();
        assert!(clock.sleeps().is_empty());
        assert_eq!(sink.events().len(), 2);
    }

    #[test]
    fn burst_after_stall_catches_up_without_sleeping() {
        // Records 100ms apart
        let log = log_of(&[(0, 0), (0, 100_000), (0, 200_000), (0, 300_000)]);
        let clock = ManualClock::starting_at(1_000_000);
        let sink = MemorySink::default();
        let mut replay = Replay::new(log, vec![sink.clone()], clock.clone());

        // First record anchors the offset
        replay.step().unwrap().unwrap();
        // The process stalls for half a second
        clock.advance(Duration::from_micros(500_000));
        while replay.step().unwrap().is_some() {}

        // All overdue records burst out back-to-back: no sleeps, and
        // their targets still honor the original anchored offset
        assert!(clock.sleeps().is_empty());
        let emitted: Vec<i64> = sink.events().iter().map(|e| e.time_micros()).collect();
        assert_eq!(
            emitted,
            vec![1_000_000, 1_100_000, 1_200_000, 1_300_000]
        );
    }

    #[test]
    fn events_route_to_their_source_sink() {
        let log = log_of(&[(1, 10), (0, 20), (1, 30)]);
        let sinks = vec![MemorySink::default(), MemorySink::default()];
        let mut replay = Replay::new(
            log,
            sinks.clone(),
            ManualClock::starting_at(1_000),
        );

        let summary = replay.run().unwrap();
        assert_eq!(summary.records, 3);
        assert_eq!(sinks[0].events().len(), 1);
        assert_eq!(sinks[1].events().len(), 2);
    }

    #[test]
    fn unknown_source_index_is_rejected() {
        let log = log_of(&[(2, 10)]);
        let mut replay = Replay::new(
            log,
            vec![MemorySink::default()],
            ManualClock::starting_at(0),
        );

        match replay.run() {
            Err(Error::UnknownSource {
                record: 0,
                index: 2,
                outputs: 1,
            }) => {}
            other => panic!("expected unknown source, got {other:?}"),
        }
    }

    #[test]
    fn output_write_failure_is_fatal() {
        use crate::testing::FailingSink;

        let log = log_of(&[(0, 10), (0, 20)]);
        let mut replay = Replay::new(log, vec![FailingSink], ManualClock::starting_at(0));

        assert!(matches!(replay.run(), Err(Error::ShortWrite { .. })));
        assert_eq!(replay.emitted(), 0);
    }

    #[test]
    fn negative_source_index_is_rejected() {
        let log = log_of(&[(-1, 10)]);
        let mut replay = Replay::new(
            log,
            vec![MemorySink::default()],
            ManualClock::starting_at(0),
        );
        assert!(matches!(
            replay.run(),
            Err(Error::UnknownSource { index: -1, .. })
        ));
    }

    #[test]
    fn replay_is_idempotent_per_session() {
        let records = [(0, 5_000i64), (0, 25_000), (0, 26_000)];

        let run = |start: i64| {
            let clock = ManualClock::starting_at(start);
            let sink = MemorySink::default();
            let mut replay =
                Replay::new(log_of(&records), vec![sink.clone()], clock.clone());
            replay.run().unwrap();
            let times: Vec<i64> = sink.events().iter().map(|e| e.time_micros()).collect();
            (times, clock.sleeps())
        };

        let (times_a, sleeps_a) = run(7_000_000);
        let (times_b, sleeps_b) = run(9_500_000);

        // Same relative timing, absolute times shifted by the two
        // sessions' different anchors
        assert_eq!(sleeps_a, sleeps_b);
        let gaps = |times: &[i64]| -> Vec<i64> {
            times.windows(2).map(|w| w[1] - w[0]).collect()
        };
        assert_eq!(gaps(&times_a), gaps(&times_b));
        assert_eq!(times_b[0] - times_a[0], 2_500_000);
    }
}
