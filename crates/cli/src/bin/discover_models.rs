//! Lists the models an endpoint serves and prints benchmark targets for them.
//!
//! The listing is fetched with the same authenticated client the launcher
//! builds: the bearer token comes from the configured key variable and the
//! transport settings from the launcher configuration.

use anyhow::Context;
use backend::{filter_text_models, generate_targets, HttpBackend, ModelCatalog, Target};
use clap::{Parser, ValueEnum};
use cli::config::LaunchConfig;
use cli::observability;
use transport::{ReqwestClientFactory, ReqwestModelCatalog};

#[derive(Debug, Parser)]
#[command(name = "discover-models")]
#[command(about = "List an endpoint's models as benchmark targets")]
#[command(version)]
struct Cli {
    /// Base URL of the OpenAI-compatible endpoint, e.g. `https://gateway/v1`.
    #[arg(long)]
    target: String,

    /// Include models that are not text generation models.
    #[arg(long)]
    all: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let telemetry = observability::init()?;

    let result = discover(&cli).await;
    telemetry.shutdown();

    let targets = result?;
    match cli.format {
        OutputFormat::Text => print!("{}", render_text(&targets)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&targets)?),
    }
    Ok(())
}

async fn discover(cli: &Cli) -> anyhow::Result<Vec<Target>> {
    let config = LaunchConfig::load().context("failed to load configuration")?;
    let startup = config.startup()?;

    let mut backend =
        HttpBackend::new(config.backend_settings(), startup, ReqwestClientFactory::new());
    backend
        .process_startup()
        .await
        .context("failed to start backend")?;
    let client = backend
        .client()
        .context("backend started without a client")?
        .clone();

    let models = ReqwestModelCatalog::new(client)
        .list_models(&cli.target)
        .await
        .with_context(|| format!("failed to list models at {}", cli.target))?;
    let models = if cli.all {
        models
    } else {
        filter_text_models(models)
    };
    let targets = generate_targets(&models, &cli.target);

    if targets.is_empty() {
        tracing::warn!(
            url = %cli.target,
            "no models found; pass --all to include non-text models"
        );
    }
    Ok(targets)
}

fn render_text(targets: &[Target]) -> String {
    targets
        .iter()
        .map(|t| format!("{}\t{}\t{}\n", t.name, t.model, t.url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_output_is_one_line_per_target() {
        let targets = vec![
            Target {
                name: "org-a".to_owned(),
                url: "http://gw".to_owned(),
                model: "org/a".to_owned(),
            },
            Target {
                name: "b".to_owned(),
                url: "http://gw".to_owned(),
                model: "b".to_owned(),
            },
        ];

        assert_eq!(
            render_text(&targets),
            "org-a\torg/a\thttp://gw\nb\tb\thttp://gw\n"
        );
    }

    #[test]
    fn target_is_required() {
        assert!(Cli::try_parse_from(["discover-models"]).is_err());

        let cli = Cli::try_parse_from(["discover-models", "--target", "http://gw"]).unwrap();
        assert!(!cli.all);
        assert_eq!(cli.format, OutputFormat::Text);
    }
}
