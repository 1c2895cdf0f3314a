//! Wall-clock source used to align capture to repeating periods.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

const MS_PER_DAY: i64 = 86_400_000;

/// Millisecond wall clock the detector aligns against.
pub trait PeriodClock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// Seconds elapsed within the current period, counted from midnight UTC.
pub fn second_in_period(now_millis: i64, period_secs: u32) -> u32 {
    let second_of_day = now_millis.rem_euclid(MS_PER_DAY) / 1000;
    (second_of_day % i64::from(period_secs.max(1))) as u32
}

/// Milliseconds elapsed within the current period, counted from midnight UTC.
pub fn ms_in_period(now_millis: i64, period_secs: u32) -> u64 {
    let period_ms = i64::from(period_secs.max(1)) * 1000;
    (now_millis.rem_euclid(MS_PER_DAY) % period_ms) as u64
}

/// System time plus a user-adjustable drift correction.
///
/// Radio operators routinely nudge their decode clock by a few hundred
/// milliseconds to line up with other stations; the drift is applied to every
/// reading rather than to the OS clock.
#[derive(Debug, Clone, Default)]
pub struct SystemClock {
    drift_ms: Arc<AtomicI64>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drift(drift_ms: i64) -> Self {
        let clock = Self::new();
        clock.set_drift_ms(drift_ms);
        clock
    }

    pub fn drift_ms(&self) -> i64 {
        self.drift_ms.load(Ordering::Relaxed)
    }

    pub fn set_drift_ms(&self, drift_ms: i64) {
        self.drift_ms.store(drift_ms, Ordering::Relaxed);
    }
}

impl PeriodClock for SystemClock {
    fn now_millis(&self) -> i64 {
        let raw = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default();
        raw.saturating_add(self.drift_ms())
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::Relaxed);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::Relaxed);
    }
}

impl PeriodClock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now_ms.load(Ordering::Relaxed)
    }
}
