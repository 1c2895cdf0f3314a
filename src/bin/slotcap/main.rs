//! Slotcap entrypoint: capture audio aligned to wall-clock periods and report
//! how much decimated signal is available as it arrives.
//!
//! # Architecture
//!
//! - Producer: the CPAL callback (or the synthetic tone loop) writes raw frames
//!   into the detector through a `CaptureDevice`
//! - Consumer: this thread drains `CaptureEvent`s and prints them

mod report;
mod synthetic;

use anyhow::Result;
use report::Reporter;
use slotcap::audio::{CaptureDevice, CaptureEvent, Detector, InputStream, SystemClock};
use slotcap::config::AppConfig;
use slotcap::{init_logging, log_debug, telemetry};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    init_logging(&config);
    telemetry::init_tracing(&config);

    let mut reporter = Reporter::new(config.json, io::stdout());
    if config.synthetic {
        synthetic::run(&config, &mut reporter)
    } else {
        run_live(&config, &mut reporter)
    }
}

fn run_live<W: Write>(config: &AppConfig, reporter: &mut Reporter<W>) -> Result<()> {
    let clock = Arc::new(SystemClock::with_drift(config.drift_ms));
    let detector = Arc::new(Detector::new(config.detector_config()?, clock)?);
    let events = detector.subscribe(config.event_capacity);
    if config.resync_on_start {
        detector.resynchronize();
    }

    let stream = InputStream::start(CaptureDevice::new(detector.clone()))?;
    log_debug(&format!("capturing from '{}'", stream.device_name()));
    reporter.started(stream.device_name(), detector.config())?;

    // One spare period covers the partial period we start in.
    let period = Duration::from_secs(u64::from(config.period_secs));
    let deadline = Instant::now() + period * (config.periods + 1);
    let mut periods_seen = 0u32;
    while periods_seen < config.periods {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            log_debug("capture deadline reached before the requested periods completed");
            break;
        }
        let Ok(event) = events.recv_timeout(remaining) else {
            continue;
        };
        if matches!(event, CaptureEvent::PeriodStarted { .. }) {
            periods_seen += 1;
        }
        reporter.event(&event)?;
    }

    let rejected_writes = stream.write_errors();
    drop(stream);
    reporter.summary(&detector, Some(rejected_writes))?;
    Ok(())
}
