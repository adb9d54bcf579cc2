#![cfg(unix)]

//! Runs the `guidellm-auth` binary against `sh` standing in for the
//! benchmarking tool.

use std::process::{Command, Output};

const BIN: &str = env!("CARGO_BIN_EXE_guidellm-auth");

/// Variables the launcher reads, cleared so the host environment cannot
/// change the outcome.
const CLEARED: &[&str] = &[
    "GUIDELLM_AUTH_CONFIG",
    "GUIDELLM_AUTH_API_KEY_ENV",
    "GUIDELLM_AUTH_HEADERS_ENV",
    "GUIDELLM_AUTH_REQUIRE_API_KEY",
    "GUIDELLM_AUTH_PREFLIGHT",
    "GUIDELLM__OPENAI__HEADERS",
    "OPENAI_API_KEY",
    "OTEL_EXPORTER_OTLP_ENDPOINT",
];

fn launcher(program: &str) -> Command {
    let mut command = Command::new(BIN);
    for var in CLEARED {
        command.env_remove(var);
    }
    command.env("GUIDELLM_AUTH_PROGRAM", program);
    command
}

fn run(command: &mut Command) -> Output {
    command.output().expect("launcher binary runs")
}

#[test]
fn tool_exit_status_becomes_process_status() {
    let output = run(launcher("sh").args(["-c", "exit 2"]));
    assert_eq!(output.status.code(), Some(2));

    let output = run(launcher("sh").args(["-c", "exit 0"]));
    assert!(output.status.success());
}

#[test]
fn tool_output_reaches_stdout_untouched() {
    let output = run(launcher("sh").args(["-c", "echo benchmark-report"]));

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "benchmark-report\n");
}

#[test]
fn missing_tool_exits_with_status_one() {
    let output = run(&mut launcher("/nonexistent/guidellm-auth-missing-tool"));

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("guidellm-auth-missing-tool"));
}

#[test]
fn invalid_configuration_exits_with_status_one() {
    let output = run(launcher("sh")
        .env("GUIDELLM_AUTH_CONFIG", "/nonexistent/guidellm-auth.toml")
        .args(["-c", "exit 0"]));

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn required_key_missing_exits_with_status_one() {
    let output = run(launcher("sh")
        .env("GUIDELLM_AUTH_REQUIRE_API_KEY", "true")
        .args(["-c", "exit 0"]));

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn bearer_header_reaches_the_tool() {
    let output = run(launcher("sh").env("OPENAI_API_KEY", "sk-e2e").args([
        "-c",
        r#"test "$GUIDELLM__OPENAI__HEADERS" = '{"Authorization":"Bearer sk-e2e"}'"#,
    ]));

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn no_key_means_no_header_variable() {
    let output = run(launcher("sh").args(["-c", r#"test -z "${GUIDELLM__OPENAI__HEADERS+set}""#]));

    assert!(output.status.success());
}
