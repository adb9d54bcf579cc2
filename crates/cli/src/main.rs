//! guidellm-auth CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Wire observability**: install the `tracing-subscriber` stack (stderr,
//!    optional JSON, optional OTLP export).
//! 2. **Resolve configuration**: defaults, optional TOML file, environment
//!    overrides (see [`cli::config`]).
//! 3. **Construct infrastructure**: pick the [`backend::BackendStartup`]
//!    variant from the API key in the environment and inject it, together with
//!    [`transport::ReqwestClientFactory`], into an [`backend::HttpBackend`].
//! 4. **Start and check**: start the backend and, when the arguments name a
//!    `--target`, list its models with the backend's client (see
//!    [`cli::preflight`]).
//! 5. **Delegate**: run the benchmarking tool via [`launcher::ExternalCli`] with
//!    this process's arguments untouched and the client's headers exported to
//!    it, and exit with its status.
//!
//! ```text
//! OPENAI_API_KEY=sk-... guidellm-auth benchmark --target https://gateway/v1 ...
//! ```

use std::ffi::OsString;

use anyhow::Context;
use backend::{delegate, ExitCode, HttpBackend, Invocation, LaunchId};
use launcher::ExternalCli;
use tracing::Instrument;
use transport::{ReqwestClientFactory, ReqwestModelCatalog};

use cli::config::LaunchConfig;
use cli::{observability, preflight};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let telemetry = observability::init()?;

    let result = run().await;
    telemetry.shutdown();

    std::process::exit(result?.as_i32());
}

async fn run() -> anyhow::Result<ExitCode> {
    let launch_id = LaunchId::new_random();
    let span = tracing::info_span!("launch", launch_id = %launch_id);

    async {
        let config = LaunchConfig::load().context("failed to load configuration")?;
        let startup = config.startup()?;

        let mut backend =
            HttpBackend::new(config.backend_settings(), startup, ReqwestClientFactory::new());
        let entry = ExternalCli::new(&config.program).with_headers_env(config.headers_env()?);

        backend
            .process_startup()
            .await
            .context("failed to start backend")?;

        let args: Vec<OsString> = std::env::args_os().skip(1).collect();
        if config.preflight {
            if let Some(client) = backend.client() {
                let catalog = ReqwestModelCatalog::new(client.clone());
                preflight::run(&catalog, &Invocation::new(args.iter().cloned())).await;
            }
        }

        tracing::info!(
            program = %config.program.display(),
            args = args.len(),
            "delegating to benchmarking tool"
        );
        let code = delegate(&backend, &entry, args)
            .await
            .with_context(|| format!("failed to run {}", config.program.display()))?;
        Ok::<_, anyhow::Error>(code)
    }
    .instrument(span)
    .await
}
