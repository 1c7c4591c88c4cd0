//! Integration tests for the `tf` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise each subcommand
//! through the actual binary, including settings files and error exits.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

const T: i64 = 1_700_000_040_000;

/// Helper: path to the settings.json fixture.
fn settings_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/settings.json")
}

fn tf() -> Command {
    let mut cmd = Command::cargo_bin("tf").unwrap();
    cmd.env_remove("TF_LOG");
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// parse / align / elapsed / next
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn parse_prints_single_entry_json() {
    tf().args(["parse", "3m"])
        .assert()
        .success()
        .stdout("{\"3m\":180000}\n");
}

#[test]
fn parse_rejects_bad_literal() {
    tf().args(["parse", "5x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid timeframe: 5x"));
}

#[test]
fn align_floors_to_period_start() {
    tf().args(["align", "1m", "--at", "1724553312842"])
        .assert()
        .success()
        .stdout("1724553300000\n");
}

#[test]
fn align_accepts_pre_epoch_instant() {
    tf().args(["align", "1m", "--at", "-1"])
        .assert()
        .success()
        .stdout("-60000\n");
}

#[test]
fn elapsed_counts_whole_periods() {
    tf().args(["elapsed", "1m", "--start", "0", "--end", "150000"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn elapsed_across_the_whole_i64_range() {
    tf().args([
        "elapsed",
        "1m",
        "--start",
        "-9223372036854775808",
        "--end",
        "9223372036854775807",
    ])
    .assert()
    .success()
    .stdout("307445734561825\n");
}

#[test]
fn align_at_i64_min_saturates() {
    tf().args(["align", "1m", "--at", "-9223372036854775808"])
        .assert()
        .success()
        .stdout("-9223372036854775808\n");
}

#[test]
fn batches_across_the_whole_i64_range() {
    let output = tf()
        .args([
            "batches",
            "1m",
            "--start",
            "-9000000000000000000",
            "--end",
            "9000000000000000000",
            "--batch-size",
            "1000000000000000",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let batches = plan.as_array().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0]["startTime"], -9_000_000_000_000_000_000_i64);
    assert_eq!(batches[0]["endTime"], 9_000_000_000_000_000_000_i64);
}

#[test]
fn next_is_within_one_period() {
    let output = tf().args(["next", "1m"]).output().unwrap();
    assert!(output.status.success());
    let left: i64 = String::from_utf8(output.stdout)
        .unwrap()
        .trim()
        .parse()
        .unwrap();
    assert!(left > 0 && left <= 60_000, "left was {}", left);
}

// ─────────────────────────────────────────────────────────────────────────────
// batches
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn batches_prints_json_plan() {
    let end = T + 10 * 60_000;
    let (start_arg, end_arg) = (T.to_string(), end.to_string());
    let output = tf()
        .args([
            "batches",
            "1m",
            "--start",
            start_arg.as_str(),
            "--end",
            end_arg.as_str(),
            "--batch-size",
            "4",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let batches = plan.as_array().unwrap();
    assert_eq!(batches.len(), 3);
    assert_eq!(batches[0]["startTime"], T);
    assert_eq!(batches[0]["endTime"], T + 3 * 60_000);
    assert_eq!(batches[2]["endTime"], end);
}

#[test]
fn batches_uses_settings_batch_size() {
    let output = tf()
        .args([
            "--config",
            settings_path(),
            "batches",
            "1m",
            "--start",
            "0",
            "--end",
            "600000",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan.as_array().unwrap().len(), 3);
}

#[test]
fn batches_rejects_zero_batch_size() {
    tf().args(["batches", "1m", "--start", "0", "--end", "600000", "--batch-size", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--batch-size must be at least 1"));
}

#[test]
fn batches_empty_range_prints_empty_array() {
    tf().args(["batches", "1h", "--start", "0", "--end", "0"])
        .assert()
        .success()
        .stdout("[]\n");
}

// ─────────────────────────────────────────────────────────────────────────────
// dates
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn midnight_truncates_epoch_input() {
    tf().args(["midnight", "1724553312842"])
        .assert()
        .success()
        .stdout("1724544000000 2024-08-25T00:00:00+00:00\n");
}

#[test]
fn midnight_rejects_invalid_date() {
    tf().args(["midnight", "not-a-date"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid date"));
}

#[test]
fn month_days_prints_json_array() {
    let output = tf().arg("month-days").output().unwrap();
    assert!(output.status.success());
    let days: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    for day in days.as_array().unwrap() {
        assert!(day["day"].as_u64().unwrap() >= 2);
    }
}

#[test]
fn legible_with_timezone_and_iso() {
    tf().args(["legible", "1724553312842", "--iso", "--tz", "America/New_York"])
        .assert()
        .success()
        .stdout("1724553312842 8/24/2024 @ 10:35:12 PM ≍ 2024-08-25 @ 02:35:12.842Z\n");
}

#[test]
fn legible_takes_timezone_and_iso_from_settings() {
    tf().args(["--config", settings_path(), "legible", "1724553312842"])
        .assert()
        .success()
        .stdout("1724553312842 8/24/2024 @ 10:35:12 PM ≍ 2024-08-25 @ 02:35:12.842Z\n");
}

#[test]
fn legible_rejects_unknown_timezone() {
    tf().args(["legible", "0", "--tz", "Mars/Base"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid timezone"));
}

// ─────────────────────────────────────────────────────────────────────────────
// settings and logging
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn missing_settings_file_fails() {
    tf().args(["--config", "/nonexistent/tf.json", "parse", "1m"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load settings"));
}

#[test]
fn debug_logging_goes_to_stderr() {
    tf().env("TF_LOG", "debug")
        .args(["parse", "7m"])
        .assert()
        .success()
        .stdout("{\"7m\":420000}\n")
        .stderr(predicate::str::contains("cached new timeframe"));
}

#[test]
fn invalid_log_filter_fails() {
    tf().args(["--log-level", "tf=notalevel", "parse", "1m"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid log filter"));
}
