use super::defaults::{MAX_EVENT_CAPACITY, MAX_PERIODS, SECONDS_PER_DAY};
use super::{AppConfig, MAX_MAX_PERIOD_SECS, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE};
use crate::audio::{DetectorConfig, FrameFormat};
use anyhow::{bail, Result};
use clap::Parser;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values against what the detector can be built with.
    pub fn validate(&mut self) -> Result<()> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            bail!(
                "--sample-rate must be between {MIN_SAMPLE_RATE} and {MAX_SAMPLE_RATE} Hz, got {}",
                self.sample_rate
            );
        }
        if self.sample_rate % 1_000 != 0 {
            bail!(
                "--sample-rate must be a whole number of kHz so periods hold whole samples, got {}",
                self.sample_rate
            );
        }
        if !(1..=MAX_MAX_PERIOD_SECS).contains(&self.max_period_secs) {
            bail!(
                "--max-period must be between 1 and {MAX_MAX_PERIOD_SECS} seconds, got {}",
                self.max_period_secs
            );
        }
        // The period is tracked by its second counter, which never moves in a 1 s period.
        if self.period_secs < 2 || self.period_secs > self.max_period_secs {
            bail!(
                "--period must be between 2 and --max-period ({}), got {}",
                self.max_period_secs,
                self.period_secs
            );
        }
        if SECONDS_PER_DAY % self.period_secs != 0 {
            bail!(
                "--period must divide a day evenly, got {}",
                self.period_secs
            );
        }
        let capacity = self.max_period_secs as usize * self.sample_rate as usize;
        if self.block_size == 0 || self.block_size >= capacity {
            bail!(
                "--block-size must be between 1 and {} (buffer capacity), got {}",
                capacity - 1,
                self.block_size
            );
        }
        if !(1..=2).contains(&self.channels) {
            bail!("--channels must be 1 or 2, got {}", self.channels);
        }
        if !(1..=MAX_PERIODS).contains(&self.periods) {
            bail!(
                "--periods must be between 1 and {MAX_PERIODS}, got {}",
                self.periods
            );
        }
        if !(1..=MAX_EVENT_CAPACITY).contains(&self.event_capacity) {
            bail!(
                "--event-capacity must be between 1 and {MAX_EVENT_CAPACITY}, got {}",
                self.event_capacity
            );
        }
        let nyquist = self.sample_rate as f32 / 2.0;
        if !(self.tone_hz > 0.0 && self.tone_hz < nyquist) {
            bail!(
                "--tone-hz must be between 0 and {nyquist} Hz (exclusive), got {}",
                self.tone_hz
            );
        }
        self.frame_format()?;
        Ok(())
    }

    pub fn frame_format(&self) -> Result<FrameFormat> {
        Ok(FrameFormat::for_channels(
            self.encoding.into(),
            self.channel.into(),
            self.channels,
        )?)
    }

    /// Detector parameters derived from validated CLI values.
    pub fn detector_config(&self) -> Result<DetectorConfig> {
        Ok(DetectorConfig {
            sample_rate: self.sample_rate,
            period_secs: self.period_secs,
            max_period_secs: self.max_period_secs,
            block_size: self.block_size,
            format: self.frame_format()?,
        })
    }

    pub fn logging_enabled(&self) -> bool {
        self.logs && !self.no_logs
    }
}
