#![cfg(unix)]

use backend::{
    select_startup, BackendStartup, EntryPoint, EnvVarName, ExitCode, Invocation, LaunchError,
    RequestHeaders,
};
use launcher::ExternalCli;

fn sh(script: &str) -> Invocation {
    Invocation::new(["-c", script])
}

#[tokio::test]
async fn exit_status_is_returned_unchanged() {
    let code = ExternalCli::new("sh").run(sh("exit 2")).await.unwrap();
    assert_eq!(code, ExitCode::new(2));

    let code = ExternalCli::new("sh").run(sh("exit 0")).await.unwrap();
    assert!(code.is_success());
}

#[tokio::test]
async fn arguments_are_passed_verbatim() {
    let invocation = Invocation::new([
        "-c",
        r#"test "$#" -eq 2 && test "$1" = "a b" && test "$2" = "--rate=5""#,
        "sh",
        "a b",
        "--rate=5",
    ]);

    let code = ExternalCli::new("sh").run(invocation).await.unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
}

fn bearer_headers(key: &str) -> RequestHeaders {
    select_startup(Some(key.to_owned())).headers()
}

// The child sees the variable only because it was exported; the test process
// itself never sets it.
#[tokio::test]
async fn headers_are_exported_to_child_as_json() {
    assert!(std::env::var_os("GUIDELLM__OPENAI__HEADERS").is_none());
    let invocation = sh(r#"test "$GUIDELLM__OPENAI__HEADERS" = '{"Authorization":"Bearer sk-child"}'"#)
        .with_headers(bearer_headers("sk-child"));

    let code = ExternalCli::new("sh").run(invocation).await.unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
}

#[tokio::test]
async fn headers_are_exported_under_configured_name() {
    let invocation = sh(r#"test "$GATEWAY_HEADERS" = '{"Authorization":"Bearer sk-gateway"}'"#)
        .with_headers(bearer_headers("sk-gateway"));

    let code = ExternalCli::new("sh")
        .with_headers_env(EnvVarName::new("GATEWAY_HEADERS").unwrap())
        .run(invocation)
        .await
        .unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
}

#[tokio::test]
async fn no_headers_leaves_variable_unset() {
    let invocation = sh(r#"test -z "${GUIDELLM__OPENAI__HEADERS+set}""#)
        .with_headers(select_startup(None).headers());

    let code = ExternalCli::new("sh").run(invocation).await.unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
}

#[tokio::test]
async fn signal_termination_maps_to_shell_convention() {
    let code = ExternalCli::new("sh").run(sh("kill -9 $$")).await.unwrap();
    assert_eq!(code, ExitCode::new(137));
}

#[tokio::test]
async fn missing_program_is_a_spawn_error() {
    let err = ExternalCli::new("/nonexistent/guidellm-auth-test-binary")
        .run(Invocation::default())
        .await
        .unwrap_err();

    match err {
        LaunchError::Spawn { program, source } => {
            assert!(program.contains("guidellm-auth-test-binary"));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected spawn error, got {other:?}"),
    }
}

#[test]
fn default_program_is_guidellm() {
    assert_eq!(ExternalCli::default().program().to_str(), Some("guidellm"));
}
