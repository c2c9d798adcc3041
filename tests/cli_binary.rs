//! Tests that drive the `privatize` binary end to end.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

// ============================================================================
// Test Infrastructure
// ============================================================================

/// Run the binary in `dir` with a clean configuration environment.
fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_privatize"))
        .current_dir(dir)
        .env_remove("PRIVATIZE_PREFIX")
        .env_remove("PRIVATIZE_INCLUDE_INTERNAL")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run privatize")
}

fn stdout_json(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON ({}): {}", e, stdout))
}

fn workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("src")).unwrap();
    fs::write(
        temp.path().join("src/engine.ts"),
        "class Engine {\n    private speed = 0;\n    /** @internal */\n    tune(): void {}\n    go(): number {\n        this.tune();\n        return this.speed;\n    }\n}\n",
    )
    .unwrap();
    temp
}

// ============================================================================
// transform
// ============================================================================

#[test]
fn text_output_is_the_transformed_source() {
    let temp = workspace();
    let output = run(temp.path(), &["transform", "src"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("private _speed = 0;"), "{}", stdout);
    assert!(stdout.contains("return this._speed;"), "{}", stdout);
    assert!(stdout.contains("this.tune();"), "{}", stdout);
}

#[test]
fn flags_reach_the_transform() {
    let temp = workspace();
    let output = run(
        temp.path(),
        &["transform", "src", "--include-internal", "--prefix", "p_"],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("private p_speed = 0;"), "{}", stdout);
    assert!(stdout.contains("    p_tune(): void"), "{}", stdout);
    assert!(stdout.contains("this.p_tune();"), "{}", stdout);
}

#[test]
fn json_output_with_out_dir() {
    let temp = workspace();
    let output = run(
        temp.path(),
        &["--format", "json", "transform", "src", "--out-dir", "dist"],
    );
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["prefix"], "_");
    assert_eq!(json["include_internal"], false);
    assert!(json["files"][0].get("output").is_none());

    let written = fs::read_to_string(temp.path().join("dist/engine.ts")).unwrap();
    assert!(written.contains("private _speed = 0;"), "{}", written);
}

#[test]
fn config_file_in_working_directory_is_used() {
    let temp = workspace();
    fs::write(
        temp.path().join("privatize.json"),
        r#"{ "customPrefix": "hidden_" }"#,
    )
    .unwrap();
    let output = run(temp.path(), &["transform", "src/engine.ts"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("private hidden_speed = 0;"), "{}", stdout);
}

#[test]
fn file_arguments_with_the_same_name_cannot_share_an_out_dir() {
    let temp = workspace();
    fs::create_dir_all(temp.path().join("a")).unwrap();
    fs::create_dir_all(temp.path().join("b")).unwrap();
    fs::write(temp.path().join("a/x.ts"), "class A {\n    private x = 1;\n}\n").unwrap();
    fs::write(temp.path().join("b/x.ts"), "class B {\n    private y = 1;\n}\n").unwrap();
    let output = run(
        temp.path(),
        &["transform", "a/x.ts", "b/x.ts", "--out-dir", "dist"],
    );
    assert_eq!(output.status.code(), Some(2));
    let json = stdout_json(&output);
    assert_eq!(json["status"], "error");
    assert!(!temp.path().join("dist/x.ts").exists());
}

#[test]
fn json_log_format_writes_json_lines_to_stderr() {
    let temp = workspace();
    let output = run(
        temp.path(),
        &["--log-level", "debug", "--log-format", "json", "transform", "src"],
    );
    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    assert!(!lines.is_empty());
    for line in lines {
        let event: Value = serde_json::from_str(line)
            .unwrap_or_else(|e| panic!("log line is not JSON ({}): {}", e, line));
        assert!(event.get("level").is_some(), "{}", line);
    }
}

// ============================================================================
// config
// ============================================================================

#[test]
fn config_reports_sources() {
    let temp = workspace();
    let output = run(
        temp.path(),
        &["--format", "json", "--include-internal", "config"],
    );
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["include_internal"]["value"], true);
    assert_eq!(json["include_internal"]["source"], "cli_flag");
    assert_eq!(json["prefix"]["value"], "_");
    assert_eq!(json["prefix"]["source"], "default");
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn missing_input_is_a_json_error_with_exit_code() {
    let temp = workspace();
    let output = run(temp.path(), &["transform", "nope.ts"]);
    assert_eq!(output.status.code(), Some(3));
    let json = stdout_json(&output);
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], 3);
}

#[test]
fn invalid_prefix_is_rejected() {
    let temp = workspace();
    let output = run(temp.path(), &["--prefix", "1bad", "transform", "src"]);
    assert_eq!(output.status.code(), Some(2));
    let json = stdout_json(&output);
    assert_eq!(json["error"]["details"]["source"], "cli_flag");
}

#[test]
fn parse_errors_carry_a_location() {
    let temp = workspace();
    fs::write(temp.path().join("src/broken.ts"), "class {\n").unwrap();
    let output = run(temp.path(), &["transform", "src"]);
    assert_eq!(output.status.code(), Some(4));
    let json = stdout_json(&output);
    assert!(json["error"]["location"]["file"]
        .as_str()
        .unwrap()
        .ends_with("broken.ts"));
}
