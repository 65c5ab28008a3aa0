#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Integration tests for the `hostprep` binary's argument handling.

use std::process::Command;

fn hostprep(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_hostprep"))
        .args(args)
        .output()
        .expect("spawn hostprep")
}

#[test]
fn unknown_flag_prints_usage_and_exits_one() {
    let output = hostprep(&["--no-such-flag"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    let first = stderr.lines().next().expect("error line");
    assert!(first.contains("ERROR"), "{first}");
    assert!(first.contains("invalid flag"), "{first}");
    assert!(stderr.contains("Usage:"));
    assert!(!stderr.contains("hostprep finished"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("hostprep finished").count(), 1);
}

#[test]
fn help_exits_zero() {
    let output = hostprep(&["--help"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--log-file"));
    assert!(stdout.contains("--dry-run"));
}

#[test]
fn version_exits_zero() {
    let output = hostprep(&["--version"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("hostprep "));
}
