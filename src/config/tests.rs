use super::{
    AppConfig, ChannelKind, EncodingKind, DEFAULT_BLOCK_SIZE, DEFAULT_PERIOD_SECS,
    DEFAULT_SAMPLE_RATE,
};
use crate::audio::{ChannelMode, SampleEncoding};
use clap::Parser;

#[test]
fn accepts_valid_defaults() {
    let mut cfg = AppConfig::parse_from(["test-app"]);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.sample_rate, DEFAULT_SAMPLE_RATE);
    assert_eq!(cfg.period_secs, DEFAULT_PERIOD_SECS);
    assert_eq!(cfg.block_size, DEFAULT_BLOCK_SIZE);
}

#[test]
fn rejects_sample_rate_out_of_bounds() {
    let mut cfg = AppConfig::parse_from(["test-app", "--sample-rate", "500"]);
    assert!(cfg.validate().is_err());
    let mut cfg = AppConfig::parse_from(["test-app", "--sample-rate", "96000"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_fractional_khz_sample_rate() {
    let mut cfg = AppConfig::parse_from(["test-app", "--sample-rate", "11025"]);
    let err = cfg.validate().expect_err("11025 Hz should be rejected");
    assert!(err.to_string().contains("whole number of kHz"));
}

#[test]
fn rejects_period_longer_than_buffer() {
    let mut cfg = AppConfig::parse_from(["test-app", "--period", "90"]);
    assert!(cfg.validate().is_err());
    let mut cfg = AppConfig::parse_from(["test-app", "--period", "90", "--max-period", "120"]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn rejects_period_that_does_not_divide_a_day() {
    let mut cfg = AppConfig::parse_from(["test-app", "--period", "7"]);
    assert!(cfg.validate().is_err());
    let mut cfg = AppConfig::parse_from(["test-app", "--period", "30"]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn rejects_zero_period() {
    let mut cfg = AppConfig::parse_from(["test-app", "--period", "0"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_one_second_period() {
    let mut cfg = AppConfig::parse_from(["test-app", "--period", "1"]);
    assert!(cfg.validate().is_err());
    let mut cfg = AppConfig::parse_from(["test-app", "--period", "2"]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn rejects_block_size_out_of_bounds() {
    let mut cfg = AppConfig::parse_from(["test-app", "--block-size", "0"]);
    assert!(cfg.validate().is_err());
    // 60 s at 12 kHz.
    let mut cfg = AppConfig::parse_from(["test-app", "--block-size", "720000"]);
    assert!(cfg.validate().is_err());
    let mut cfg = AppConfig::parse_from(["test-app", "--block-size", "719999"]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn rejects_channel_mode_that_does_not_match_frame() {
    let mut cfg = AppConfig::parse_from(["test-app", "--channel", "left"]);
    assert!(cfg.validate().is_err());
    let mut cfg = AppConfig::parse_from(["test-app", "--channels", "2", "--channel", "mono"]);
    assert!(cfg.validate().is_err());
    let mut cfg = AppConfig::parse_from(["test-app", "--channels", "2", "--channel", "both"]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn rejects_unsupported_channel_count() {
    let mut cfg = AppConfig::parse_from(["test-app", "--channels", "3"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_tone_above_nyquist() {
    let mut cfg = AppConfig::parse_from(["test-app", "--tone-hz", "6000"]);
    assert!(cfg.validate().is_err());
    let mut cfg = AppConfig::parse_from(["test-app", "--tone-hz", "0"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_event_capacity_out_of_bounds() {
    let mut cfg = AppConfig::parse_from(["test-app", "--event-capacity", "0"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn accepts_negative_drift() {
    let mut cfg = AppConfig::parse_from(["test-app", "--drift-ms", "-250"]);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.drift_ms, -250);
}

#[test]
fn detector_config_carries_frame_layout() {
    let mut cfg = AppConfig::parse_from([
        "test-app",
        "--channels",
        "2",
        "--channel",
        "right",
        "--encoding",
        "f32",
        "--period",
        "60",
    ]);
    cfg.validate().expect("stereo f32 config should be valid");
    let detector = cfg.detector_config().expect("detector config");
    assert_eq!(detector.period_secs, 60);
    assert_eq!(detector.format.mode(), ChannelMode::Right);
    assert_eq!(detector.format.encoding(), SampleEncoding::F32);
    assert_eq!(detector.format.bytes_per_frame(), 8);
    assert_eq!(detector.device_rate(), 48_000);
    assert!(detector.validate().is_ok());
}

#[test]
fn cli_kinds_map_onto_audio_types() {
    assert_eq!(ChannelMode::from(ChannelKind::Both), ChannelMode::Both);
    assert_eq!(SampleEncoding::from(EncodingKind::I16), SampleEncoding::I16);
}

#[test]
fn no_logs_overrides_logs() {
    let cfg = AppConfig::parse_from(["test-app", "--logs", "--no-logs"]);
    assert!(!cfg.logging_enabled());
    let cfg = AppConfig::parse_from(["test-app", "--logs"]);
    assert!(cfg.logging_enabled());
}
