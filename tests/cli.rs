// Drives the compiled binary against scripted classifier output.
// HOME and XDG_CONFIG_HOME point into a temp dir so no real config is read.

use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn run(dir: &TempDir, script: &str, extra: &[&str]) -> std::process::Output {
    let script_path = dir.path().join("script.json");
    fs::write(&script_path, script).unwrap();

    let mut cmd = Command::cargo_bin("scribbler").unwrap();
    cmd.env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .arg("cat")
        .arg("--script")
        .arg(&script_path)
        .args(["--tick-ms", "2", "-t", "15", "-c", "25"])
        .args(extra);
    cmd.output().unwrap()
}

#[test]
fn recognised_word_wins() {
    let dir = tempdir().unwrap();
    let out = run(&dir, r#"[[["dog", 0.4], ["cat", 0.3], ["bird", 0.1]]]"#, &[]);

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.lines().last().unwrap().starts_with("recognised \"cat\""),
        "unexpected output: {stdout}"
    );
}

#[test]
fn unrecognised_word_times_out() {
    let dir = tempdir().unwrap();
    let out = run(&dir, r#"[[["dog", 0.7], ["cat", 0.2]], null]"#, &[]);

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("time's up"), "unexpected output: {stdout}");
    assert!(stdout.contains("  0s"), "countdown should reach zero: {stdout}");
}

#[test]
fn json_output_ends_with_terminal_snapshot() {
    let dir = tempdir().unwrap();
    let out = run(&dir, r#"[[["cat", 0.9]]]"#, &["--json"]);

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let last: serde_json::Value = serde_json::from_str(stdout.lines().last().unwrap()).unwrap();
    assert_eq!(last["status"], "Won");
    assert_eq!(last["target_word"], "cat");
    assert_eq!(last["top_guesses"][0]["label"], "cat");
}

#[test]
fn missing_script_fails() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("scribbler").unwrap();
    cmd.env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .args(["cat", "--script"])
        .arg(Path::new("/definitely/not/here.json"));
    let out = cmd.output().unwrap();
    assert!(!out.status.success());
}
