use anyhow::Result;
use serde_json::json;
use slotcap::audio::{CaptureEvent, Detector, DetectorConfig};
use std::io::Write;

/// Prints capture events either as JSON lines or as short human-readable lines.
pub(crate) struct Reporter<W: Write> {
    json: bool,
    out: W,
}

impl<W: Write> Reporter<W> {
    pub(crate) fn new(json: bool, out: W) -> Self {
        Self { json, out }
    }

    pub(crate) fn started(&mut self, source: &str, config: &DetectorConfig) -> Result<()> {
        if self.json {
            let line = json!({ "event": "started", "source": source, "config": config });
            writeln!(self.out, "{line}")?;
        } else {
            writeln!(
                self.out,
                "capturing from {source}: {} Hz device, {} Hz output, {} s period, {} sample blocks",
                config.device_rate(),
                config.sample_rate,
                config.period_secs,
                config.block_size
            )?;
        }
        Ok(())
    }

    pub(crate) fn event(&mut self, event: &CaptureEvent) -> Result<()> {
        if self.json {
            writeln!(self.out, "{}", serde_json::to_string(event)?)?;
            return Ok(());
        }
        let label = event.label();
        match event {
            CaptureEvent::FramesWritten { valid } => {
                writeln!(self.out, "{label:<16} {valid} samples")?
            }
            CaptureEvent::PeriodStarted { second } => {
                writeln!(self.out, "{label:<16} second {second}")?
            }
            CaptureEvent::Resynchronized { from, to } => {
                writeln!(self.out, "{label:<16} {from} -> {to}")?
            }
            CaptureEvent::Reset => writeln!(self.out, "{label}")?,
        }
        Ok(())
    }

    /// Final counters. `rejected_writes` is only known for live streams.
    pub(crate) fn summary(&mut self, detector: &Detector, rejected_writes: Option<usize>) -> Result<()> {
        let stats = detector.stats();
        if self.json {
            let mut line = json!({
                "event": "stats",
                "watermark": detector.watermark(),
                "stats": stats,
            });
            if let Some(rejected) = rejected_writes {
                line["rejected_writes"] = json!(rejected);
            }
            writeln!(self.out, "{line}")?;
        } else {
            write!(
                self.out,
                "done: {} samples buffered, {} frames accepted, {} dropped, {} blocks decimated, {} skipped, {} wraps",
                detector.watermark(),
                stats.frames_accepted,
                stats.frames_dropped,
                stats.blocks_decimated,
                stats.blocks_skipped,
                stats.period_wraps
            )?;
            if let Some(rejected) = rejected_writes {
                write!(self.out, ", {rejected} writes rejected")?;
            }
            writeln!(self.out)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotcap::audio::ManualClock;
    use std::sync::Arc;

    fn detector() -> Detector {
        let config = DetectorConfig {
            sample_rate: 1_000,
            period_secs: 2,
            max_period_secs: 2,
            block_size: 8,
            ..DetectorConfig::default()
        };
        Detector::new(config, Arc::new(ManualClock::new(0))).expect("valid config")
    }

    fn render(json: bool, rejected_writes: Option<usize>) -> String {
        let mut reporter = Reporter::new(json, Vec::new());
        reporter
            .summary(&detector(), rejected_writes)
            .expect("summary");
        String::from_utf8(reporter.out).expect("utf8")
    }

    #[test]
    fn summary_reports_rejected_writes_for_live_runs() {
        let line: serde_json::Value =
            serde_json::from_str(render(true, Some(3)).trim()).expect("json");
        assert_eq!(line["event"], "stats");
        assert_eq!(line["rejected_writes"], 3);
        assert!(render(false, Some(3)).contains("3 writes rejected"));
    }

    #[test]
    fn summary_omits_rejected_writes_without_a_stream() {
        let line: serde_json::Value =
            serde_json::from_str(render(true, None).trim()).expect("json");
        assert!(line.get("rejected_writes").is_none());
        assert!(!render(false, None).contains("rejected"));
    }

    #[test]
    fn text_events_carry_their_label() {
        let mut reporter = Reporter::new(false, Vec::new());
        reporter
            .event(&CaptureEvent::PeriodStarted { second: 0 })
            .expect("event");
        let text = String::from_utf8(reporter.out).expect("utf8");
        assert!(text.starts_with("period_started"));
        assert!(text.trim_end().ends_with("second 0"));
    }
}
