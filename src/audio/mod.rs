//! Period-aligned audio capture pipeline.
//!
//! Raw PCM arrives from the sound card at `NDOWN` times the analysis rate,
//! gets lowpass-filtered and decimated, and lands in a fixed buffer that
//! always starts at the beginning of the current wall-clock period. Decoders
//! read the valid prefix of that buffer; they learn how much is valid from
//! [`CaptureEvent`] notifications.

mod clock;
mod detector;
mod device;
mod error;
mod filter;
mod frame;
mod notify;
mod stream;

pub use clock::{ms_in_period, second_in_period, ManualClock, PeriodClock, SystemClock};
pub use detector::{
    CapturePhase, CaptureStats, Detector, DetectorConfig, Resync, WriteOutcome, MAX_CAPACITY,
};
pub use device::CaptureDevice;
pub use error::CaptureError;
pub use filter::{Decimator, CONTEXT, LAG, NDOWN, TAPS};
pub use frame::{ChannelMode, FrameFormat, SampleEncoding};
pub use notify::CaptureEvent;
pub use stream::InputStream;
