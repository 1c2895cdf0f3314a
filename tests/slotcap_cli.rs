use std::process::Command;

fn combined_output(output: &std::process::Output) -> String {
    let mut combined = String::new();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn slotcap_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_slotcap").expect("slotcap test binary not built")
}

const SYNTHETIC_ARGS: [&str; 13] = [
    "--synthetic",
    "--period",
    "2",
    "--max-period",
    "2",
    "--sample-rate",
    "1000",
    "--block-size",
    "100",
    "--tone-hz",
    "100",
    "--periods",
    "1",
];

#[test]
fn slotcap_help_mentions_name() {
    let output = Command::new(slotcap_bin())
        .arg("--help")
        .output()
        .expect("run slotcap --help");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("Slotcap"));
}

#[test]
fn slotcap_rejects_period_that_does_not_divide_a_day() {
    let output = Command::new(slotcap_bin())
        .args(["--synthetic", "--period", "7"])
        .output()
        .expect("run slotcap with bad period");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("--period"));
}

#[test]
fn slotcap_synthetic_json_reports_blocks_and_period_start() {
    let output = Command::new(slotcap_bin())
        .args(SYNTHETIC_ARGS)
        .arg("--json")
        .env("SLOTCAP_NO_LOGS", "true")
        .output()
        .expect("run slotcap --synthetic --json");
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(lines.first().map(|v| v["event"].clone()), Some("started".into()));
    assert_eq!(lines.last().map(|v| v["event"].clone()), Some("stats".into()));
    assert!(lines.iter().any(|v| v["event"] == "frames_written"));
    assert_eq!(
        lines.iter().filter(|v| v["event"] == "period_started").count(),
        1
    );
    assert!(lines
        .iter()
        .filter(|v| v["event"] == "frames_written")
        .all(|v| v["valid"].as_u64().is_some_and(|valid| valid <= 2_000)));
}

#[test]
fn slotcap_synthetic_text_prints_summary() {
    let output = Command::new(slotcap_bin())
        .args(SYNTHETIC_ARGS)
        .env("SLOTCAP_NO_LOGS", "true")
        .output()
        .expect("run slotcap --synthetic");
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("capturing from synthetic"));
    assert!(stdout.contains("period_started"));
    assert!(stdout.contains("done:"));
}
