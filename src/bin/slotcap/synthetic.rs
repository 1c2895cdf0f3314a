//! Offline capture driven by a generated tone and a manual clock, so the
//! pipeline can be exercised without an input device.

use crate::report::Reporter;
use anyhow::Result;
use slotcap::audio::{
    CaptureDevice, CaptureEvent, Detector, FrameFormat, ManualClock, SampleEncoding,
};
use slotcap::config::AppConfig;
use slotcap::log_debug;
use std::f32::consts::PI;
use std::io::Write;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Simulated callback cadence.
const CALLBACK_MS: i64 = 10;
const AMPLITUDE: f32 = 0.5;

pub(crate) fn run<W: Write>(config: &AppConfig, reporter: &mut Reporter<W>) -> Result<()> {
    let detector_config = config.detector_config()?;
    let clock = Arc::new(ManualClock::new(wall_clock_ms() + config.drift_ms));
    let detector = Arc::new(Detector::new(detector_config.clone(), clock.clone())?);
    let events = detector.subscribe(config.event_capacity);
    if config.resync_on_start {
        detector.resynchronize();
    }

    let device = CaptureDevice::new(detector.clone());
    device.open();
    reporter.started("synthetic", &detector_config)?;

    let device_rate = detector_config.device_rate();
    let frames_per_callback = (device_rate as usize * CALLBACK_MS as usize) / 1000;
    let mut tone = ToneSource::new(config.tone_hz, device_rate, detector_config.format);
    let mut chunk = Vec::new();

    let max_callbacks =
        u64::from(config.periods + 1) * u64::from(config.period_secs) * (1000 / CALLBACK_MS as u64)
            + 1;
    let mut periods_seen = 0u32;
    let mut callbacks = 0u64;
    while periods_seen < config.periods && callbacks < max_callbacks {
        tone.fill(frames_per_callback, &mut chunk);
        device.write(&chunk)?;
        clock.advance(CALLBACK_MS);
        callbacks += 1;

        for event in events.try_iter() {
            if matches!(event, CaptureEvent::PeriodStarted { .. }) {
                periods_seen += 1;
            }
            reporter.event(&event)?;
        }
    }
    if periods_seen < config.periods {
        log_debug(&format!(
            "synthetic run stopped after {callbacks} callbacks with {periods_seen} periods"
        ));
    }

    device.close();
    reporter.summary(&detector, None)
}

fn wall_clock_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

/// Sine generator that encodes interleaved frames in the device's wire format.
struct ToneSource {
    phase: f32,
    step: f32,
    format: FrameFormat,
}

impl ToneSource {
    fn new(tone_hz: f32, device_rate: u32, format: FrameFormat) -> Self {
        Self {
            phase: 0.0,
            step: 2.0 * PI * tone_hz / device_rate as f32,
            format,
        }
    }

    fn fill(&mut self, frames: usize, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(frames * self.format.bytes_per_frame());
        for _ in 0..frames {
            let sample = AMPLITUDE * self.phase.sin();
            self.phase = (self.phase + self.step) % (2.0 * PI);
            for _ in 0..self.format.channels() {
                match self.format.encoding() {
                    SampleEncoding::I16 => {
                        let value = (sample * i16::MAX as f32) as i16;
                        out.extend_from_slice(&value.to_le_bytes());
                    }
                    SampleEncoding::F32 => out.extend_from_slice(&sample.to_le_bytes()),
                }
            }
        }
    }
}
