/// Analysis rate the decoders expect.
pub const DEFAULT_SAMPLE_RATE: u32 = 12_000;
pub const MIN_SAMPLE_RATE: u32 = 1_000;
/// Device rate is four times this, so 48 kHz keeps the device under 192 kHz.
pub const MAX_SAMPLE_RATE: u32 = 48_000;

pub const DEFAULT_PERIOD_SECS: u32 = 15;
pub const DEFAULT_MAX_PERIOD_SECS: u32 = 60;
pub const MAX_MAX_PERIOD_SECS: u32 = 300;

/// One FFT's worth of output samples per decimation pass.
pub const DEFAULT_BLOCK_SIZE: usize = 3_456;

pub const DEFAULT_CHANNELS: u16 = 1;
pub const DEFAULT_TONE_HZ: f32 = 1_500.0;
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

pub(super) const MAX_EVENT_CAPACITY: usize = 65_536;
pub(super) const MAX_PERIODS: u32 = 10_000;
/// Day boundaries must line up with period boundaries, so periods divide a day.
pub(super) const SECONDS_PER_DAY: u32 = 86_400;
