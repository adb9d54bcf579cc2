//! guidellm-auth CLI delegation adapter.
//!
//! Implements the [`backend::EntryPoint`] trait by running the benchmarking
//! tool (`guidellm` by default) as a child process:
//!
//! - arguments are passed through verbatim;
//! - stdin, stdout and stderr are inherited, so the tool owns the terminal;
//! - when the invocation carries headers, they are exported to the child as a
//!   JSON object under the configured variable (`GUIDELLM__OPENAI__HEADERS` by
//!   default), which the benchmarking tool reads into the headers of its own
//!   OpenAI client. Without headers the child's environment is left as
//!   inherited;
//! - the child's exit status is returned unchanged. A child killed by a signal
//!   reports `128 + signal`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Process spawning lives here; the [`backend`] crate sees
//! only [`backend::EntryPoint`].

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use backend::{EntryPoint, EnvVarName, ExitCode, Invocation, LaunchError};
use tokio::process::Command;
use tracing::Instrument;

/// Program run when none is configured.
pub const DEFAULT_PROGRAM: &str = "guidellm";

/// Runs an external command-line tool as the delegated entry point.
#[derive(Debug, Clone)]
pub struct ExternalCli {
    program: PathBuf,
    headers_env: EnvVarName,
}

impl ExternalCli {
    /// Creates an entry point for `program`, exporting headers as
    /// `GUIDELLM__OPENAI__HEADERS`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            headers_env: EnvVarName::openai_headers(),
        }
    }

    /// Sets the environment variable the headers are exported under.
    pub fn with_headers_env(mut self, headers_env: EnvVarName) -> Self {
        self.headers_env = headers_env;
        self
    }

    /// Returns the program that is run.
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, invocation: &Invocation) -> Result<Command, LaunchError> {
        let mut command = Command::new(&self.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if !invocation.headers.is_empty() {
            let encoded =
                serde_json::to_string(&invocation.headers).map_err(|e| LaunchError::Encode {
                    program: self.program.display().to_string(),
                    message: e.to_string(),
                })?;
            command.env(self.headers_env.as_str(), encoded);
        }
        Ok(command)
    }

    async fn run_child(&self, invocation: Invocation) -> Result<ExitCode, LaunchError> {
        let program = self.program.display().to_string();

        let mut child = self
            .command(&invocation)?
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: program.clone(),
                source,
            })?;
        tracing::debug!(
            pid = child.id(),
            headers = invocation.headers.len(),
            headers_env = %self.headers_env,
            "started delegated tool"
        );

        let status = child
            .wait()
            .await
            .map_err(|source| LaunchError::Wait { program, source })?;

        let code = exit_code(status);
        if code.is_success() {
            tracing::debug!(exit_code = code.as_i32(), "delegated tool exited");
        } else {
            tracing::warn!(exit_code = code.as_i32(), "delegated tool exited with failure");
        }
        Ok(code)
    }
}

impl Default for ExternalCli {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

#[async_trait]
impl EntryPoint for ExternalCli {
    async fn run(&self, invocation: Invocation) -> Result<ExitCode, LaunchError> {
        let span = tracing::info_span!(
            "external_cli",
            program = %self.program.display(),
            args = invocation.args.len()
        );
        self.run_child(invocation).instrument(span).await
    }
}

fn exit_code(status: std::process::ExitStatus) -> ExitCode {
    if let Some(code) = status.code() {
        return ExitCode::new(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return ExitCode::from_signal(signal);
        }
    }
    ExitCode::new(1)
}
