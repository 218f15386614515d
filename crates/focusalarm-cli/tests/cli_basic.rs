//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "focusalarm-cli", "--"])
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_config_show_prints_defaults() {
    let (stdout, _, code) = run_cli(&["config", "show"]);
    assert_eq!(code, 0, "config show failed");
    assert!(stdout.contains("level_duration_ms = 20000"));
    assert!(stdout.contains("beep_interval_ms = 3000"));
}

#[test]
fn test_beep_plays_once_and_exits() {
    let (stdout, _, code) = run_cli(&["beep"]);
    assert_eq!(code, 0, "beep failed");
    assert!(stdout.contains("beep (level 1)"));
    assert!(stdout.contains("Urgency Level: 1"));
    assert!(stdout.contains("cleared"));
}

#[test]
fn test_ring_auto_cancel_terminates() {
    let (stdout, _, code) = run_cli(&["ring", "--auto-cancel", "1"]);
    assert_eq!(code, 0, "ring failed");
    assert!(stdout.contains("beep (level 1)"));
    assert!(stdout.contains("Urgency Level: 1"));
}
