//! Raw PCM frame layout and per-frame sample extraction.

use super::error::CaptureError;
use serde::Serialize;

/// Encoding of one sample slot inside a frame. Always little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleEncoding {
    I16,
    F32,
}

impl SampleEncoding {
    pub fn bytes(self) -> usize {
        match self {
            SampleEncoding::I16 => 2,
            SampleEncoding::F32 => 4,
        }
    }

    fn decode(self, bytes: &[u8]) -> f32 {
        match self {
            SampleEncoding::I16 => i16::from_le_bytes([bytes[0], bytes[1]]) as f32 / 32_768.0,
            SampleEncoding::F32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        }
    }
}

/// Which slot(s) of a frame feed the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMode {
    Mono,
    Left,
    Right,
    Both,
}

impl ChannelMode {
    pub fn label(self) -> &'static str {
        match self {
            ChannelMode::Mono => "mono",
            ChannelMode::Left => "left",
            ChannelMode::Right => "right",
            ChannelMode::Both => "both",
        }
    }

    /// Channel count a frame must carry for this mode.
    pub fn channels(self) -> u16 {
        match self {
            ChannelMode::Mono => 1,
            ChannelMode::Left | ChannelMode::Right | ChannelMode::Both => 2,
        }
    }
}

/// Layout of one interleaved input frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameFormat {
    encoding: SampleEncoding,
    mode: ChannelMode,
}

impl FrameFormat {
    pub fn new(encoding: SampleEncoding, mode: ChannelMode) -> Self {
        Self { encoding, mode }
    }

    /// Build a format from a device channel count, rejecting modes the frame cannot serve.
    pub fn for_channels(
        encoding: SampleEncoding,
        mode: ChannelMode,
        channels: u16,
    ) -> Result<Self, CaptureError> {
        if mode.channels() != channels {
            return Err(CaptureError::InvalidConfig(format!(
                "channel mode '{}' needs {} channel(s), device frame has {channels}",
                mode.label(),
                mode.channels()
            )));
        }
        Ok(Self::new(encoding, mode))
    }

    pub fn mono_i16() -> Self {
        Self::new(SampleEncoding::I16, ChannelMode::Mono)
    }

    pub fn encoding(&self) -> SampleEncoding {
        self.encoding
    }

    pub fn mode(&self) -> ChannelMode {
        self.mode
    }

    pub fn channels(&self) -> u16 {
        self.mode.channels()
    }

    pub fn bytes_per_frame(&self) -> usize {
        self.encoding.bytes() * usize::from(self.channels())
    }

    /// Decode whole frames from `data` into `out`, one sample per frame.
    ///
    /// `data` must hold exactly `out.len()` frames.
    pub(crate) fn store(&self, data: &[u8], out: &mut [f32]) {
        let frame_bytes = self.bytes_per_frame();
        let slot = self.encoding.bytes();
        debug_assert_eq!(data.len(), out.len() * frame_bytes);
        for (frame, dst) in data.chunks_exact(frame_bytes).zip(out.iter_mut()) {
            *dst = match self.mode {
                ChannelMode::Mono | ChannelMode::Left => self.encoding.decode(&frame[..slot]),
                ChannelMode::Right => self.encoding.decode(&frame[slot..]),
                ChannelMode::Both => {
                    let left = self.encoding.decode(&frame[..slot]);
                    let right = self.encoding.decode(&frame[slot..]);
                    (left + right) * 0.5
                }
            };
        }
    }
}

impl Default for FrameFormat {
    fn default() -> Self {
        Self::mono_i16()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn i16_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn frame_sizes_follow_layout() {
        assert_eq!(FrameFormat::mono_i16().bytes_per_frame(), 2);
        let stereo = FrameFormat::new(SampleEncoding::F32, ChannelMode::Both);
        assert_eq!(stereo.bytes_per_frame(), 8);
    }

    #[test]
    fn stereo_modes_pick_expected_slot() {
        let data = i16_bytes(&[16_384, -16_384, 8_192, 0]);
        let mut out = [0.0f32; 2];

        FrameFormat::new(SampleEncoding::I16, ChannelMode::Left).store(&data, &mut out);
        assert_eq!(out, [0.5, 0.25]);

        FrameFormat::new(SampleEncoding::I16, ChannelMode::Right).store(&data, &mut out);
        assert_eq!(out, [-0.5, 0.0]);

        FrameFormat::new(SampleEncoding::I16, ChannelMode::Both).store(&data, &mut out);
        assert_eq!(out, [0.0, 0.125]);
    }

    #[test]
    fn f32_samples_pass_through() {
        let data: Vec<u8> = [0.75f32, -0.25].iter().flat_map(|s| s.to_le_bytes()).collect();
        let mut out = [0.0f32; 2];
        FrameFormat::new(SampleEncoding::F32, ChannelMode::Mono).store(&data, &mut out);
        assert_eq!(out, [0.75, -0.25]);
    }

    #[test]
    fn rejects_mode_channel_mismatch() {
        assert!(FrameFormat::for_channels(SampleEncoding::I16, ChannelMode::Left, 1).is_err());
        assert!(FrameFormat::for_channels(SampleEncoding::I16, ChannelMode::Mono, 2).is_err());
        assert!(FrameFormat::for_channels(SampleEncoding::I16, ChannelMode::Both, 2).is_ok());
    }
}
