//! Live input from the host's default microphone via CPAL.
//!
//! The stream is opened with exactly the format the detector expects. No
//! device search or rate negotiation happens here: if the default device
//! cannot deliver that format, opening fails.

use super::device::CaptureDevice;
use super::frame::SampleEncoding;
use crate::log_debug;
use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, StreamConfig};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Running CPAL input stream feeding a [`CaptureDevice`].
///
/// Dropping the handle stops the stream and closes the device.
pub struct InputStream {
    stream: cpal::Stream,
    device: CaptureDevice,
    device_name: String,
    write_errors: Arc<AtomicUsize>,
}

impl InputStream {
    pub fn start(device: CaptureDevice) -> Result<Self> {
        let host = cpal::default_host();
        let input = host
            .default_input_device()
            .context("no default input device available")?;
        let device_name = input
            .name()
            .unwrap_or_else(|_| "unknown input device".to_string());

        let detector_cfg = device.detector().config().clone();
        let stream_config = StreamConfig {
            channels: detector_cfg.format.channels(),
            sample_rate: SampleRate(detector_cfg.device_rate()),
            buffer_size: BufferSize::Default,
        };
        log_debug(&format!(
            "Opening '{device_name}': rate={}Hz channels={} encoding={:?}",
            stream_config.sample_rate.0,
            stream_config.channels,
            detector_cfg.format.encoding()
        ));

        let write_errors = Arc::new(AtomicUsize::new(0));
        let warned = Arc::new(AtomicBool::new(false));
        let err_fn = |err| log_debug(&format!("audio_stream_error: {err}"));

        device.open();
        let stream = match detector_cfg.format.encoding() {
            SampleEncoding::I16 => {
                let sink = device.clone();
                let errors = write_errors.clone();
                let warned = warned.clone();
                let mut scratch = Vec::<u8>::new();
                input.build_input_stream(
                    &stream_config,
                    move |data: &[i16], _| {
                        scratch.clear();
                        for sample in data {
                            scratch.extend_from_slice(&sample.to_le_bytes());
                        }
                        forward(&sink, &scratch, &errors, &warned);
                    },
                    err_fn,
                    None,
                )
            }
            SampleEncoding::F32 => {
                let sink = device.clone();
                let errors = write_errors.clone();
                let warned = warned.clone();
                let mut scratch = Vec::<u8>::new();
                input.build_input_stream(
                    &stream_config,
                    move |data: &[f32], _| {
                        scratch.clear();
                        for sample in data {
                            scratch.extend_from_slice(&sample.to_le_bytes());
                        }
                        forward(&sink, &scratch, &errors, &warned);
                    },
                    err_fn,
                    None,
                )
            }
        }
        .map_err(|err| {
            device.close();
            anyhow!(
                "'{device_name}' cannot capture {}Hz x{}: {err}",
                stream_config.sample_rate.0,
                stream_config.channels
            )
        })?;

        if let Err(err) = stream.play() {
            device.close();
            return Err(anyhow!("failed to start audio stream: {err}"));
        }

        Ok(Self {
            stream,
            device,
            device_name,
            write_errors,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Blocks the transport handed over that the detector refused.
    pub fn write_errors(&self) -> usize {
        self.write_errors.load(Ordering::Relaxed)
    }
}

impl Drop for InputStream {
    fn drop(&mut self) {
        if let Err(err) = self.stream.pause() {
            log_debug(&format!("failed to pause audio stream: {err}"));
        }
        self.device.close();
    }
}

fn forward(sink: &CaptureDevice, bytes: &[u8], errors: &AtomicUsize, warned: &AtomicBool) {
    if let Err(err) = sink.write(bytes) {
        errors.fetch_add(1, Ordering::Relaxed);
        if !warned.swap(true, Ordering::AcqRel) {
            log_debug(&format!("capture write rejected: {err}"));
        }
    }
}
