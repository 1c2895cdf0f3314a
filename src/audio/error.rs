//! Errors surfaced by the capture pipeline.
//!
//! Only caller mistakes end up here. Running out of room in a period is part
//! of normal operation and is reported through `WriteOutcome` instead.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// Input block length is not a whole number of frames.
    TornFrame { len: usize, bytes_per_frame: usize },

    /// Output block size is zero or does not fit in the buffer.
    InvalidBlockSize { requested: usize, capacity: usize },

    /// Detector or frame configuration is unusable.
    InvalidConfig(String),

    /// The device adapter is closed.
    DeviceClosed,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::TornFrame {
                len,
                bytes_per_frame,
            } => write!(
                f,
                "torn frame: {len} bytes is not a multiple of the {bytes_per_frame}-byte frame"
            ),
            CaptureError::InvalidBlockSize {
                requested,
                capacity,
            } => write!(
                f,
                "invalid output block size {requested} (buffer capacity {capacity})"
            ),
            CaptureError::InvalidConfig(msg) => write!(f, "invalid capture config: {msg}"),
            CaptureError::DeviceClosed => write!(f, "capture device is not open"),
        }
    }
}

impl std::error::Error for CaptureError {}
