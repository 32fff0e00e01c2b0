//! Integration tests for the `group-slots` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to run the `find` and `day`
//! subcommands against the JSON snapshot fixtures, including config loading,
//! flag overrides and error reporting.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: path to a file under tests/fixtures.
fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

/// Helper: the binary with the user config directory pointed at nothing.
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("group-slots").unwrap();
    cmd.env("XDG_CONFIG_HOME", fixture("no-config"))
        .env_remove("RUST_LOG");
    cmd
}

/// Helper: run and parse stdout as JSON, asserting success.
fn run_json<I, S>(args: I) -> serde_json::Value
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let output = cmd().args(args).output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout must be JSON")
}

/// Helper: `find` over the 2026-03-16 working day of the team fixture.
fn find_args(extra: &[&str]) -> Vec<String> {
    let mut args: Vec<String> = [
        "find",
        "--data",
        fixture("team.json").as_str(),
        "--group",
        "team",
        "--as",
        "a",
        "--start",
        "2026-03-16T09:00:00Z",
        "--end",
        "2026-03-16T18:00:00Z",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    args.extend(extra.iter().map(|s| s.to_string()));
    args
}

// ─────────────────────────────────────────────────────────────────────────────
// find subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn find_inclusive_skips_standup_and_touching_hours() {
    let slots = run_json(find_args(&[]));
    let starts: Vec<&str> = slots
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["start"].as_str().unwrap())
        .collect();

    assert_eq!(
        starts,
        vec![
            "2026-03-16T09:00:00Z",
            "2026-03-16T10:00:00Z",
            "2026-03-16T11:00:00Z",
            "2026-03-16T15:00:00Z",
            "2026-03-16T16:00:00Z",
            "2026-03-16T17:00:00Z",
        ]
    );
}

#[test]
fn find_half_open_flag_keeps_eight_slots() {
    let slots = run_json(find_args(&["--overlap", "half-open"]));
    let slots = slots.as_array().unwrap();

    assert_eq!(slots.len(), 8);
    assert!(slots.iter().all(|s| s["start"] != "2026-03-16T13:00:00Z"));
}

#[test]
fn find_reads_overlap_rule_from_config() {
    let config = fixture("half_open.toml");
    let mut args = vec!["--config".to_string(), config];
    args.extend(find_args(&[]));

    let slots = run_json(args);
    assert_eq!(slots.as_array().unwrap().len(), 8);
}

#[test]
fn find_duration_sets_slot_length() {
    let slots = run_json(find_args(&["--duration", "30"]));
    let first = &slots.as_array().unwrap()[0];

    assert_eq!(first["start"], "2026-03-16T09:00:00Z");
    assert_eq!(first["end"], "2026-03-16T09:30:00Z");
}

#[test]
fn find_rejects_zero_duration() {
    cmd()
        .args(find_args(&["--duration", "0"]))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid duration"));
}

#[test]
fn find_rejects_inverted_range() {
    let team = fixture("team.json");
    cmd()
        .args([
            "find",
            "--data",
            team.as_str(),
            "--group",
            "team",
            "--as",
            "a",
            "--start",
            "2026-03-16T18:00:00Z",
            "--end",
            "2026-03-16T09:00:00Z",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date range"));
}

#[test]
fn find_as_non_member_is_forbidden() {
    let team = fixture("team.json");
    cmd()
        .args([
            "find",
            "--data",
            team.as_str(),
            "--group",
            "team",
            "--as",
            "outsider",
            "--start",
            "2026-03-16T09:00:00Z",
            "--end",
            "2026-03-16T18:00:00Z",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Forbidden"));
}

#[test]
fn find_unknown_group_is_not_found() {
    let team = fixture("team.json");
    cmd()
        .args([
            "find",
            "--data",
            team.as_str(),
            "--group",
            "ghosts",
            "--as",
            "a",
            "--start",
            "2026-03-16T09:00:00Z",
            "--end",
            "2026-03-16T18:00:00Z",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));
}

// ─────────────────────────────────────────────────────────────────────────────
// day subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn day_lists_every_slot_with_conflicts() {
    let team = fixture("team.json");
    let slots = run_json([
        "day", "--data", team.as_str(), "--group", "team", "--as", "b", "--date", "2026-03-16",
    ]);
    let slots = slots.as_array().unwrap();

    assert_eq!(slots.len(), 9);
    assert_eq!(slots[4]["start"], "2026-03-16T13:00:00Z");
    assert_eq!(slots[4]["available"], false);
    assert_eq!(slots[4]["conflicts"], serde_json::json!(["Ann Lee: Standup"]));
    assert_eq!(slots[0]["available"], true);
    assert_eq!(slots[0]["conflicts"], serde_json::json!([]));
}

#[test]
fn day_honours_timezone_and_hours_flags() {
    // 09:00-12:00 in New York on 2026-03-16 is 13:00-16:00 UTC.
    let team = fixture("team.json");
    let slots = run_json([
        "day",
        "--data",
        team.as_str(),
        "--group",
        "team",
        "--as",
        "a",
        "--date",
        "2026-03-16",
        "--timezone",
        "America/New_York",
        "--start-hour",
        "9",
        "--end-hour",
        "12",
        "--overlap",
        "half-open",
    ]);
    let slots = slots.as_array().unwrap();

    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0]["start"], "2026-03-16T13:00:00Z");
    assert_eq!(slots[0]["available"], false);
    assert_eq!(slots[1]["available"], true);
}

#[test]
fn day_rejects_unknown_timezone() {
    let team = fixture("team.json");
    cmd()
        .args([
            "day",
            "--data",
            team.as_str(),
            "--group",
            "team",
            "--as",
            "a",
            "--date",
            "2026-03-16",
            "--timezone",
            "Nowhere/Special",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid timezone"));
}

#[test]
fn day_rejects_malformed_date() {
    let team = fixture("team.json");
    cmd()
        .args([
            "day", "--data", team.as_str(), "--group", "team", "--as", "a", "--date", "16/03/2026",
        ])
        .assert()
        .failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Inputs and config
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn missing_snapshot_file_reports_path() {
    cmd()
        .args([
            "find",
            "--data",
            "/nonexistent/calendar.json",
            "--group",
            "team",
            "--as",
            "a",
            "--start",
            "2026-03-16T09:00:00Z",
            "--end",
            "2026-03-16T18:00:00Z",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn snapshot_with_inverted_event_is_rejected() {
    let backwards = fixture("backwards.json");
    cmd()
        .args([
            "find",
            "--data",
            backwards.as_str(),
            "--group",
            "team",
            "--as",
            "a",
            "--start",
            "2026-03-16T09:00:00Z",
            "--end",
            "2026-03-16T18:00:00Z",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid calendar snapshot"));
}

#[test]
fn invalid_config_is_rejected() {
    let config = fixture("bad_hours.toml");
    let mut args = vec!["--config".to_string(), config];
    args.extend(find_args(&[]));

    cmd()
        .args(args)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config file"));
}

#[test]
fn no_subcommand_shows_usage() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
