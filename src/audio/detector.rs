//! Period-aligned capture buffer.
//!
//! Raw frames from the device are collected into a working window of
//! `block_size * NDOWN` samples. Each time the window fills it is decimated
//! into the output buffer at the watermark (`kin`), so the output buffer
//! always holds "this period's signal so far" at the decimated rate.
//!
//! The watermark is tied to wall-clock time: it is reset when the period
//! wraps and can be re-derived from the clock on demand (`resynchronize`).
//! Once a period's buffer is full, further input for that period is dropped
//! rather than buffered, so the audio callback never blocks or allocates.

use super::clock::{ms_in_period, second_in_period, PeriodClock};
use super::error::CaptureError;
use super::filter::{Decimator, CONTEXT, NDOWN};
use super::frame::FrameFormat;
use super::notify::{CaptureEvent, Notifier};
use crate::lock_or_recover;
use crossbeam_channel::Receiver;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, trace};

/// Static parameters for a detector. The buffer capacity is derived from
/// these once and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectorConfig {
    /// Decimated (output) sample rate in Hz. The device runs at `NDOWN` times this.
    pub sample_rate: u32,
    /// Length of the repeating alignment period.
    pub period_secs: u32,
    /// Longest period the buffer must hold; sizes the output buffer.
    pub max_period_secs: u32,
    /// Output samples produced per decimation pass.
    pub block_size: usize,
    pub format: FrameFormat,
}

/// Largest output buffer a detector will allocate, in samples.
pub const MAX_CAPACITY: usize = 1 << 24;

impl DetectorConfig {
    pub fn capacity(&self) -> usize {
        self.max_period_secs as usize * self.sample_rate as usize
    }

    /// Raw frame rate the device has to deliver.
    pub fn device_rate(&self) -> u32 {
        self.sample_rate * NDOWN as u32
    }

    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.sample_rate == 0 {
            return Err(CaptureError::InvalidConfig(
                "sample rate must be non-zero".to_string(),
            ));
        }
        if self.period_secs == 0 || self.period_secs > self.max_period_secs {
            return Err(CaptureError::InvalidConfig(format!(
                "period of {}s must be between 1 and {}s",
                self.period_secs, self.max_period_secs
            )));
        }
        let capacity = (self.max_period_secs as usize)
            .checked_mul(self.sample_rate as usize)
            .filter(|capacity| *capacity <= MAX_CAPACITY)
            .ok_or_else(|| {
                CaptureError::InvalidConfig(format!(
                    "{}s at {} Hz exceeds the {MAX_CAPACITY} sample buffer limit",
                    self.max_period_secs, self.sample_rate
                ))
            })?;
        if self.block_size == 0 || self.block_size >= capacity {
            return Err(CaptureError::InvalidBlockSize {
                requested: self.block_size,
                capacity,
            });
        }
        if self.block_size.checked_mul(NDOWN).is_none() {
            return Err(CaptureError::InvalidConfig(format!(
                "block of {} samples overflows the working window",
                self.block_size
            )));
        }
        Ok(())
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 12_000,
            period_secs: 15,
            max_period_secs: 60,
            block_size: 3_456,
            format: FrameFormat::default(),
        }
    }
}

/// Where the detector is in its write cycle.
///
/// `Draining` only exists while a full window is being decimated inside the
/// critical section; outside callers observe `Idle` or `Capturing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapturePhase {
    Idle,
    Capturing,
    Draining,
}

/// What happened to one block handed to [`Detector::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Frames in the block.
    pub requested: usize,
    /// Frames copied into the working window.
    pub accepted: usize,
    /// Frames discarded because the period's buffer is full.
    pub dropped: usize,
    /// Windows drained during this write.
    pub blocks_completed: usize,
    /// Watermark after the write.
    pub watermark: usize,
    /// Byte count reported back to the transport (always the full block).
    pub bytes_consumed: usize,
}

/// Watermark movement performed by [`Detector::resynchronize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resync {
    pub from: usize,
    pub to: usize,
    pub delta: isize,
}

/// Running diagnostic counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CaptureStats {
    pub frames_accepted: u64,
    pub frames_dropped: u64,
    pub blocks_decimated: u64,
    pub blocks_skipped: u64,
    pub period_wraps: u64,
    pub resyncs: u64,
    pub notifications_dropped: usize,
}

/// Everything the producer and control paths mutate. Lives behind one lock.
struct CaptureBuffers {
    output: Vec<f32>,
    /// `CONTEXT` samples carried from the previous window, then the window.
    window: Vec<f32>,
    kin: usize,
    window_pos: usize,
    block_size: usize,
    /// False until the carried context holds real input.
    primed: bool,
    last_second: Option<u32>,
    phase: CapturePhase,
    stats: CaptureStats,
}

impl CaptureBuffers {
    fn new(capacity: usize, block_size: usize) -> Self {
        Self {
            output: vec![0.0; capacity],
            window: vec![0.0; CONTEXT + block_size * NDOWN],
            kin: 0,
            window_pos: 0,
            block_size,
            primed: false,
            last_second: None,
            phase: CapturePhase::Idle,
            stats: CaptureStats::default(),
        }
    }

    /// Drop the partial window and the carried context.
    fn restart_window(&mut self) {
        self.window_pos = 0;
        self.primed = false;
    }

    /// Decimate a full window into the output buffer. Returns false when the
    /// block no longer fits in this period and was discarded.
    fn drain(&mut self, filter: &Decimator) -> bool {
        self.phase = CapturePhase::Draining;
        if !self.primed {
            let first = self.window[CONTEXT];
            self.window[..CONTEXT].fill(first);
            self.primed = true;
        }
        let block = self.block_size;
        let fits = self.kin < self.output.len() - block;
        if fits {
            let start = self.kin;
            filter.decimate_with_history(&self.window, &mut self.output[start..start + block]);
            self.kin += block;
            self.stats.blocks_decimated += 1;
            trace!(kin = self.kin, "decimated block");
        } else {
            self.stats.blocks_skipped += 1;
            debug!(kin = self.kin, block, "output buffer exhausted; block discarded");
        }
        let len = self.window.len();
        self.window.copy_within(len - CONTEXT.., 0);
        self.window_pos = 0;
        self.phase = CapturePhase::Capturing;
        fits
    }
}

/// Shared capture pipeline. Cheap to share behind an `Arc`; every method
/// takes `&self`.
pub struct Detector {
    config: DetectorConfig,
    filter: Decimator,
    clock: Arc<dyn PeriodClock>,
    state: Mutex<CaptureBuffers>,
    notifier: Notifier,
}

impl Detector {
    pub fn new(config: DetectorConfig, clock: Arc<dyn PeriodClock>) -> Result<Self, CaptureError> {
        config.validate()?;
        let state = CaptureBuffers::new(config.capacity(), config.block_size);
        Ok(Self {
            config,
            filter: Decimator::new(),
            clock,
            state: Mutex::new(state),
            notifier: Notifier::new(),
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    pub fn bytes_per_frame(&self) -> usize {
        self.config.format.bytes_per_frame()
    }

    /// Register a consumer. Events beyond `capacity` unread ones are dropped.
    pub fn subscribe(&self, capacity: usize) -> Receiver<CaptureEvent> {
        self.notifier.subscribe(capacity)
    }

    pub fn second_in_period(&self) -> u32 {
        second_in_period(self.clock.now_millis(), self.config.period_secs)
    }

    /// Number of valid entries at the front of the output buffer.
    pub fn watermark(&self) -> usize {
        lock_or_recover(&self.state, "detector.watermark").kin
    }

    pub fn phase(&self) -> CapturePhase {
        lock_or_recover(&self.state, "detector.phase").phase
    }

    pub fn output_block_size(&self) -> usize {
        lock_or_recover(&self.state, "detector.output_block_size").block_size
    }

    pub fn stats(&self) -> CaptureStats {
        let mut stats = lock_or_recover(&self.state, "detector.stats").stats.clone();
        stats.notifications_dropped = self.notifier.dropped();
        stats
    }

    /// Copy of the valid part of the output buffer.
    pub fn snapshot(&self) -> Vec<f32> {
        self.with_valid(|valid| valid.to_vec())
    }

    /// Copy as many valid samples as fit into `dst`, returning the count.
    pub fn copy_valid(&self, dst: &mut [f32]) -> usize {
        self.with_valid(|valid| {
            let n = valid.len().min(dst.len());
            dst[..n].copy_from_slice(&valid[..n]);
            n
        })
    }

    /// Run `f` on the valid samples while holding the lock. Keep `f` short;
    /// the producer waits on it.
    pub fn with_valid<R>(&self, f: impl FnOnce(&[f32]) -> R) -> R {
        let state = lock_or_recover(&self.state, "detector.with_valid");
        f(&state.output[..state.kin])
    }

    /// Accept one block of raw frames from the device.
    ///
    /// Fails only when the block contains a partial frame. Frames that do not
    /// fit in the current period are dropped and reported in the outcome.
    pub fn write(&self, data: &[u8]) -> Result<WriteOutcome, CaptureError> {
        let frame_bytes = self.bytes_per_frame();
        if data.len() % frame_bytes != 0 {
            return Err(CaptureError::TornFrame {
                len: data.len(),
                bytes_per_frame: frame_bytes,
            });
        }
        let requested = data.len() / frame_bytes;
        let mut events = Vec::new();

        let outcome = {
            let mut guard = lock_or_recover(&self.state, "detector.write");
            let state = &mut *guard;
            // Read under the lock so a concurrent resync cannot slip between
            // this reading and the comparison below.
            let second = self.second_in_period();

            // The period counter going backwards means a new period began.
            if state.last_second.is_some_and(|prev| second < prev) {
                debug!(second, kin = state.kin, "period wrapped; restarting buffer");
                state.kin = 0;
                state.restart_window();
                state.stats.period_wraps += 1;
                events.push(CaptureEvent::PeriodStarted { second });
            }
            state.last_second = Some(second);

            // Counted in raw frames, not decimated samples.
            let acceptable = (state.output.len() - state.kin) * NDOWN;
            let accepted = requested.min(acceptable);
            let dropped = requested - accepted;
            if dropped > 0 {
                state.stats.frames_dropped += dropped as u64;
                debug!(dropped, kin = state.kin, second, "dropped frames past end of period buffer");
            }
            state.stats.frames_accepted += accepted as u64;
            if accepted > 0 && state.phase == CapturePhase::Idle {
                state.phase = CapturePhase::Capturing;
            }

            let window_len = state.block_size * NDOWN;
            let mut remaining = accepted;
            let mut blocks_completed = 0usize;
            while remaining > 0 {
                let offset = accepted - remaining;
                let chunk = (window_len - state.window_pos).min(remaining);
                let pos = CONTEXT + state.window_pos;
                self.config.format.store(
                    &data[offset * frame_bytes..(offset + chunk) * frame_bytes],
                    &mut state.window[pos..pos + chunk],
                );
                state.window_pos += chunk;
                if state.window_pos == window_len {
                    state.drain(&self.filter);
                    blocks_completed += 1;
                    events.push(CaptureEvent::FramesWritten { valid: state.kin });
                }
                remaining -= chunk;
            }

            WriteOutcome {
                requested,
                accepted,
                dropped,
                blocks_completed,
                watermark: state.kin,
                bytes_consumed: data.len(),
            }
        };

        self.notifier.publish(&events);
        Ok(outcome)
    }

    /// Return to `Idle`: watermark and window position go to zero. Buffer
    /// contents are left alone since nothing past the watermark is readable.
    pub fn reset(&self) {
        {
            let mut state = lock_or_recover(&self.state, "detector.reset");
            state.kin = 0;
            state.restart_window();
            state.last_second = None;
            state.phase = CapturePhase::Idle;
        }
        debug!("detector reset");
        self.notifier.publish(&[CaptureEvent::Reset]);
    }

    /// Move the watermark to where the clock says we are in the period.
    ///
    /// The output buffer is rotated by the same amount, so samples already
    /// captured keep their position relative to the watermark instead of
    /// being thrown away.
    pub fn resynchronize(&self) -> Resync {
        let period = self.config.period_secs;

        let resync = {
            let mut guard = lock_or_recover(&self.state, "detector.resynchronize");
            let state = &mut *guard;
            let now = self.clock.now_millis();
            let target = ms_in_period(now, period) * u64::from(self.config.sample_rate) / 1000;
            let from = state.kin;
            let to = (target as usize).min(state.output.len());
            let delta = to as isize - from as isize;

            state.kin = to;
            state.restart_window();
            state.last_second = Some(second_in_period(now, period));
            state.phase = CapturePhase::Capturing;
            state.stats.resyncs += 1;

            if delta < 0 {
                state.output.rotate_left(delta.unsigned_abs());
            } else {
                state.output.rotate_right(delta as usize);
            }
            Resync { from, to, delta }
        };

        debug!(
            from = resync.from,
            to = resync.to,
            delta = resync.delta,
            "advanced detector buffer"
        );
        self.notifier.publish(&[CaptureEvent::Resynchronized {
            from: resync.from,
            to: resync.to,
        }]);
        resync
    }

    /// Zero the whole output buffer. The watermark is untouched.
    pub fn clear_content(&self) {
        let mut state = lock_or_recover(&self.state, "detector.clear_content");
        state.output.fill(0.0);
        debug!("cleared detector buffer content");
    }

    /// Change how many output samples each decimation pass produces.
    ///
    /// Any partially filled window is discarded so the next pass starts on a
    /// clean phase.
    pub fn set_output_block_size(&self, block_size: usize) -> Result<(), CaptureError> {
        let capacity = self.capacity();
        if block_size == 0 || block_size >= capacity {
            return Err(CaptureError::InvalidBlockSize {
                requested: block_size,
                capacity,
            });
        }
        let mut state = lock_or_recover(&self.state, "detector.set_output_block_size");
        state.block_size = block_size;
        state.window.clear();
        state.window.resize(CONTEXT + block_size * NDOWN, 0.0);
        state.restart_window();
        Ok(())
    }

    #[cfg(test)]
    pub(super) fn window_position(&self) -> usize {
        lock_or_recover(&self.state, "detector.window_position").window_pos
    }

    #[cfg(test)]
    pub(super) fn fill_output_for_tests(&self, f: impl Fn(usize) -> f32) {
        let mut state = lock_or_recover(&self.state, "detector.fill_output_for_tests");
        for (i, slot) in state.output.iter_mut().enumerate() {
            *slot = f(i);
        }
    }

    #[cfg(test)]
    pub(super) fn output_at(&self, index: usize) -> f32 {
        lock_or_recover(&self.state, "detector.output_at").output[index]
    }
}
