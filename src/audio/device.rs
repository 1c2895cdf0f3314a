//! Adapter between the audio transport and the detector.

use super::detector::{Detector, WriteOutcome};
use super::error::CaptureError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Byte sink the audio transport writes into.
///
/// Opening and closing only gate writes; `reset` resets the detector and
/// leaves the transport alone.
#[derive(Clone)]
pub struct CaptureDevice {
    detector: Arc<Detector>,
    open: Arc<AtomicBool>,
}

impl CaptureDevice {
    pub fn new(detector: Arc<Detector>) -> Self {
        Self {
            detector,
            open: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn detector(&self) -> &Arc<Detector> {
        &self.detector
    }

    pub fn open(&self) {
        self.open.store(true, Ordering::Release);
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    pub fn bytes_per_frame(&self) -> usize {
        self.detector.bytes_per_frame()
    }

    /// Forward a block of whole frames to the detector.
    pub fn write(&self, data: &[u8]) -> Result<WriteOutcome, CaptureError> {
        if !self.is_open() {
            return Err(CaptureError::DeviceClosed);
        }
        self.detector.write(data)
    }

    /// Reset the pipeline and report whether the device is still open.
    pub fn reset(&self) -> bool {
        self.detector.reset();
        self.is_open()
    }
}
