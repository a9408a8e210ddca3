//! evrec: capture kernel input events into a binary log.
//!
//! Opens every device named in the device map, multiplexes their
//! events through one readiness poller, and appends each
//! `(source_index, event)` record to the log in arrival order.
//! Recording runs until SIGINT/SIGTERM or a fatal error; the log is
//! valid up to the last fully persisted record either way.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use evreplay::capture::Capture;
use evreplay::config::DeviceMap;
use evreplay::log::LogWriter;
use evtap::{EvdevSource, FdPoller};

/// Record input-device events into a replayable log.
#[derive(Debug, Parser)]
#[command(name = "evrec", version, about)]
struct Args {
    /// Device map (TOML) naming the sources to record, in index order.
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Log file to write; created or truncated.
    #[arg(short, long, value_name = "FILE", default_value = "events.log")]
    out: PathBuf,
}

fn run(args: &Args) -> evreplay::Result<()> {
    let map = DeviceMap::load(&args.config)?;

    let mut sources = Vec::with_capacity(map.devices.len());
    for index in 0..map.devices.len() {
        sources.push(EvdevSource::open(map.device_path(index))?);
    }
    let poller = FdPoller::new(&sources)?;
    let log = LogWriter::create(&args.out)?;

    let mut capture = Capture::new(sources, poller, log);
    let stop = capture.stop_flag();
    signal_hook::flag::register(signal_hook::consts::SIGINT, stop.clone())?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, stop)?;

    info!(
        devices = map.devices.len(),
        log = %args.out.display(),
        "recording; stop with Ctrl-C"
    );
    let summary = capture.run()?;
    info!(records = summary.records, "recording finished");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
