//! End-to-end tests for the `twfc` CLI (§6.3).
//!
//! Each test writes a `.twf` source file to a temp dir, invokes the built
//! `twfc` binary against it, and asserts on its stdout/stderr/exit code.

use std::path::PathBuf;
use std::process::Command;

fn find_twfc() -> PathBuf {
    let mut path = std::env::current_exe()
        .expect("cannot find current exe")
        .parent()
        .expect("cannot find parent dir")
        .to_path_buf();

    if path.file_name().map_or(false, |n| n == "deps") {
        path = path.parent().unwrap().to_path_buf();
    }

    let twfc = path.join("twfc");
    assert!(twfc.exists(), "twfc binary not found at {}. Run `cargo build -p twfc` first.", twfc.display());
    twfc
}

fn write_source(dir: &std::path::Path, name: &str, source: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, source).expect("failed to write source file");
    path
}

#[test]
fn check_succeeds_on_clean_source() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file = write_source(dir.path(), "a.twf", "workflow A():\n    activity Greet()\nactivity Greet():\n    return\n");

    let output = Command::new(find_twfc()).args(["check", file.to_str().unwrap()]).output().expect("failed to invoke twfc");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn check_fails_on_undefined_reference() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file = write_source(dir.path(), "a.twf", "workflow A():\n    activity Missing()\n");

    let output = Command::new(find_twfc()).args(["check", file.to_str().unwrap()]).output().expect("failed to invoke twfc");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("resolve error"), "stderr: {stderr}");
}

#[test]
fn check_lenient_exits_zero_despite_errors() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file = write_source(dir.path(), "a.twf", "workflow A():\n    activity Missing()\n");

    let output = Command::new(find_twfc())
        .args(["check", "--lenient", file.to_str().unwrap()])
        .output()
        .expect("failed to invoke twfc");

    assert!(output.status.success());
}

#[test]
fn parse_emits_json_ast_and_always_exits_zero() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file = write_source(dir.path(), "a.twf", "workflow A():\n    activity Missing()\n");

    let output = Command::new(find_twfc()).args(["parse", file.to_str().unwrap()]).output().expect("failed to invoke twfc");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("stdout is valid JSON");
    assert!(json["definitions"].is_array());
}

#[test]
fn symbols_json_lists_workflow_and_activity() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file = write_source(dir.path(), "a.twf", "workflow A():\n    activity Greet()\nactivity Greet():\n    return\n");

    let output = Command::new(find_twfc())
        .args(["symbols", "--json", file.to_str().unwrap()])
        .output()
        .expect("failed to invoke twfc");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let symbols: serde_json::Value = serde_json::from_str(&stdout).expect("stdout is valid JSON");
    let names: Vec<_> = symbols.as_array().unwrap().iter().map(|s| s["name"].as_str().unwrap()).collect();
    assert!(names.contains(&"A"));
    assert!(names.contains(&"Greet"));
}

#[test]
fn multiple_files_are_concatenated_into_one_document() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let first = write_source(dir.path(), "a.twf", "workflow A():\n    activity Greet()\n");
    let second = write_source(dir.path(), "b.twf", "activity Greet():\n    return\n");

    let output = Command::new(find_twfc())
        .args(["check", first.to_str().unwrap(), second.to_str().unwrap()])
        .output()
        .expect("failed to invoke twfc");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}
