//! Command-line parsing and validation helpers.

mod defaults;
#[cfg(test)]
mod tests;
mod validation;

use crate::audio::{ChannelMode, SampleEncoding};
use clap::{Parser, ValueEnum};

pub use defaults::{
    DEFAULT_BLOCK_SIZE, DEFAULT_CHANNELS, DEFAULT_EVENT_CAPACITY, DEFAULT_MAX_PERIOD_SECS,
    DEFAULT_PERIOD_SECS, DEFAULT_SAMPLE_RATE, DEFAULT_TONE_HZ, MAX_MAX_PERIOD_SECS,
    MAX_SAMPLE_RATE, MIN_SAMPLE_RATE,
};

/// CLI options for slotcap. Validated values keep the detector constructible.
#[derive(Debug, Parser, Clone)]
#[command(
    about = "Slotcap: period-aligned audio capture and decimation",
    author,
    version
)]
pub struct AppConfig {
    /// Decimated output sample rate (Hz); the device runs at 4x this rate
    #[arg(long = "sample-rate", default_value_t = DEFAULT_SAMPLE_RATE)]
    pub sample_rate: u32,

    /// Length of the repeating capture period (seconds)
    #[arg(long = "period", default_value_t = DEFAULT_PERIOD_SECS)]
    pub period_secs: u32,

    /// Longest period the capture buffer must hold (seconds)
    #[arg(long = "max-period", default_value_t = DEFAULT_MAX_PERIOD_SECS)]
    pub max_period_secs: u32,

    /// Output samples produced per decimation pass
    #[arg(long = "block-size", default_value_t = DEFAULT_BLOCK_SIZE)]
    pub block_size: usize,

    /// Channels in each input frame
    #[arg(long, default_value_t = DEFAULT_CHANNELS)]
    pub channels: u16,

    /// Which channel(s) of the frame feed the detector
    #[arg(long = "channel", value_enum, default_value_t = ChannelKind::Mono)]
    pub channel: ChannelKind,

    /// PCM sample encoding delivered by the device
    #[arg(long = "encoding", value_enum, default_value_t = EncodingKind::I16)]
    pub encoding: EncodingKind,

    /// Clock correction applied to period alignment (milliseconds)
    #[arg(long = "drift-ms", default_value_t = 0, allow_negative_numbers = true)]
    pub drift_ms: i64,

    /// Align the buffer to the wall clock before capture starts
    #[arg(long = "resync-on-start", default_value_t = false)]
    pub resync_on_start: bool,

    /// Number of periods to capture before exiting
    #[arg(long, default_value_t = 1)]
    pub periods: u32,

    /// Feed a generated tone instead of opening the input device
    #[arg(long, default_value_t = false)]
    pub synthetic: bool,

    /// Frequency of the synthetic tone (Hz)
    #[arg(long = "tone-hz", default_value_t = DEFAULT_TONE_HZ)]
    pub tone_hz: f32,

    /// Capacity of the consumer event queue
    #[arg(long = "event-capacity", default_value_t = DEFAULT_EVENT_CAPACITY)]
    pub event_capacity: usize,

    /// Print events as newline-delimited JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "SLOTCAP_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "SLOTCAP_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,
}

/// Channel selection accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChannelKind {
    Mono,
    Left,
    Right,
    Both,
}

impl From<ChannelKind> for ChannelMode {
    fn from(kind: ChannelKind) -> Self {
        match kind {
            ChannelKind::Mono => ChannelMode::Mono,
            ChannelKind::Left => ChannelMode::Left,
            ChannelKind::Right => ChannelMode::Right,
            ChannelKind::Both => ChannelMode::Both,
        }
    }
}

/// Sample encodings accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EncodingKind {
    I16,
    F32,
}

impl From<EncodingKind> for SampleEncoding {
    fn from(kind: EncodingKind) -> Self {
        match kind {
            EncodingKind::I16 => SampleEncoding::I16,
            EncodingKind::F32 => SampleEncoding::F32,
        }
    }
}
