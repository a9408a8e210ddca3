//! evplay: replay a recorded event log against live devices.
//!
//! Opens every device named in the device map as an output, advertises
//! each one's configured capabilities, validates the log, and replays
//! it with the original inter-event timing anchored to "now".
//!
//! Injecting an event category a device never advertised has undefined
//! behavior at the kernel/driver boundary; keep the device map's
//! capability sets in sync with what was recorded.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use evreplay::clock::WallClock;
use evreplay::config::DeviceMap;
use evreplay::log::LogReader;
use evreplay::replay::Replay;
use evtap::EvdevSink;

/// Replay a recorded input-event log with original timing.
#[derive(Debug, Parser)]
#[command(name = "evplay", version, about)]
struct Args {
    /// The log file to replay.
    #[arg(value_name = "LOG")]
    log: PathBuf,

    /// Device map (TOML) naming the outputs, in the recording's
    /// source-index order, with the capabilities each advertises.
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,
}

fn run(args: &Args) -> evreplay::Result<()> {
    let map = DeviceMap::load(&args.config)?;

    let mut outputs = Vec::with_capacity(map.devices.len());
    for (index, entry) in map.devices.iter().enumerate() {
        let sink = EvdevSink::open(map.device_path(index))?;
        sink.advertise(&entry.parsed_capabilities()?)
            .map_err(evreplay::Error::Capability)?;
        outputs.push(sink);
    }

    let log = LogReader::open(&args.log)?;
    info!(
        log = %args.log.display(),
        records = log.record_count(),
        outputs = outputs.len(),
        "replaying"
    );

    let summary = Replay::new(log, outputs, WallClock).run()?;
    info!(records = summary.records, "replay finished");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // A missing LOG argument never reaches run(): clap prints usage
    // and exits with its own distinct code.
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
