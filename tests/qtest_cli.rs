//! End-to-end tests for the `qtest` binary.
//!
//! Each test runs the compiled driver against a script from `tests/scripts`
//! (or an inline script written to a temp file) and checks the exit status
//! and transcript.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

fn script(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("scripts")
        .join(name)
}

fn qtest(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qtest"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run qtest")
}

fn run_script(name: &str) -> Output {
    let path = script(name);
    qtest(&["--file", path.to_str().expect("utf-8 path")])
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// =============================================================================
// Script Traces
// =============================================================================

#[test]
fn test_trace_insert_remove() {
    let output = run_script("trace-01-ops.cmd");
    assert!(output.status.success(), "{}", stdout(&output));
    assert!(stdout(&output).contains("q = [gerbil bear dolphin meerkat bear gerbil]"));
}

#[test]
fn test_trace_reverse() {
    let output = run_script("trace-02-reverse.cmd");
    assert!(output.status.success(), "{}", stdout(&output));
    assert!(stdout(&output).contains("q = [c b a]"));
}

#[test]
fn test_trace_sort() {
    let output = run_script("trace-03-sort.cmd");
    assert!(output.status.success(), "{}", stdout(&output));
    assert!(stdout(&output).contains("q = [bear bear dolphin gerbil meerkat]"));
}

#[test]
fn test_trace_faults() {
    let output = run_script("trace-04-faults.cmd");
    let out = stdout(&output);
    assert!(output.status.success(), "{out}");
    assert!(out.contains("allocation refused"));
    assert!(!out.contains("still allocated"));
}

#[test]
fn test_trace_errors_exit_nonzero() {
    let output = run_script("trace-05-errors.cmd");
    assert!(!output.status.success());

    let out = stdout(&output);
    assert_eq!(out.matches("ERROR:").count(), 4, "{out}");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("4 of 6 commands failed"), "{stderr}");
}

// =============================================================================
// Input Sources and Flags
// =============================================================================

#[test]
fn test_reads_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_qtest"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn qtest");

    child
        .stdin
        .take()
        .expect("stdin piped")
        .write_all(b"new\nit b\nit a\nsort\nrh a\n")
        .expect("Failed to write script");

    let output = child.wait_with_output().expect("Failed to wait for qtest");
    assert!(output.status.success());
    assert!(stdout(&output).contains("Removed a from queue"));
}

#[test]
fn test_missing_script_fails() {
    let output = qtest(&["--file", "/nonexistent/script.cmd"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to open script"), "{stderr}");
}

#[test]
fn test_config_file_and_overrides() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let config = dir.path().join("qtest.toml");
    std::fs::write(&config, "[harness]\nstring_length = 3\nshow_after = false\n")
        .expect("Failed to write config");

    let commands = dir.path().join("script.cmd");
    std::fs::write(&commands, "new\nit elephant\nrh ele\n").expect("Failed to write script");

    let output = qtest(&[
        "--config",
        config.to_str().expect("utf-8 path"),
        "--file",
        commands.to_str().expect("utf-8 path"),
        "--echo",
    ]);
    let out = stdout(&output);
    assert!(output.status.success(), "{out}");
    assert!(out.contains("cmd> rh ele"));
    assert!(out.contains("Removed ele from queue"));
    assert!(!out.contains("q = ["));
}

#[test]
fn test_strategy_flag() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let commands = dir.path().join("script.cmd");
    std::fs::write(&commands, "new\nih b\nih c\nih a\nsort\nrh a\nrh b\nrh c\n")
        .expect("Failed to write script");

    let output = qtest(&[
        "--strategy",
        "swap",
        "--file",
        commands.to_str().expect("utf-8 path"),
    ]);
    assert!(output.status.success(), "{}", stdout(&output));
}

#[test]
fn test_invalid_config_fails() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = dir.path().join("qtest.toml");
    std::fs::write(&config, "[harness]\nstring_length = \"long\"\n").expect("Failed to write config");

    let output = qtest(&["--config", config.to_str().expect("utf-8 path")]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse config file"), "{stderr}");
}
