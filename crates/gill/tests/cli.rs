//! Runs the built `gill` binary against stand-in fish tools.

#![cfg(unix)]

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Project whose `.gill/config.toml` holds `config`.
fn project(config: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join(".gill")).unwrap();
    std::fs::write(dir.path().join(".gill/config.toml"), config).unwrap();
    dir
}

/// Run `gill --root <root> <args>` feeding `input` on stdin.
fn gill(root: &Path, args: &[&str], input: String) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_gill"))
        .arg("--root")
        .arg(root)
        .args(args)
        .env("XDG_CONFIG_HOME", root)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    let mut stdin = child.stdin.take().unwrap();
    let writer = std::thread::spawn(move || {
        let _ = stdin.write_all(input.as_bytes());
    });
    let output = child.wait_with_output().unwrap();
    writer.join().unwrap();
    output
}

#[test]
fn fmt_stdin_reports_formatter_that_exits_without_reading() {
    let dir = project("[tools]\nfish_indent = \"false\"\n");

    for input in ["echo hi\n".to_string(), "echo hi\n".repeat(40_000)] {
        let output = gill(dir.path(), &["fmt", "-"], input);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert_eq!(output.status.code(), Some(1), "stderr: {stderr}");
        assert!(stderr.contains("exited with code 1"), "stderr: {stderr}");
        assert!(output.stdout.is_empty());
    }
}

#[test]
fn fmt_stdin_writes_formatted_text() {
    let dir = project("[tools]\nfish_indent = \"cat\"\n");
    let output = gill(dir.path(), &["fmt", "-"], "echo hi\n".to_string());
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "echo hi\n");
}
