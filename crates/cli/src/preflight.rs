//! Target check run between backend startup and delegation.
//!
//! When the delegated arguments name a `--target`, its model list is fetched
//! with the started backend's client. The outcome is only logged: a benchmark
//! is never blocked by the check, but a rejected key or an unlisted `--model`
//! is reported before the tool spends its run discovering it.

use backend::{check_target, DiscoveryError, Invocation, ModelCatalog};

/// What the check found.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// No `--target` was given.
    Skipped,
    /// The endpoint answered and serves the requested model, if any.
    Passed {
        /// Number of models the endpoint lists.
        models: usize,
    },
    /// The endpoint answered but does not list the requested model.
    MissingModel {
        /// The `--model` value.
        model: String,
    },
    /// The model list could not be fetched.
    Failed(DiscoveryError),
}

/// Checks the target named in `invocation` and logs the result.
pub async fn run<C>(catalog: &C, invocation: &Invocation) -> Outcome
where
    C: ModelCatalog + ?Sized,
{
    let Some(target) = invocation.option_value("target") else {
        tracing::debug!("no --target argument; skipping preflight");
        return Outcome::Skipped;
    };
    let model = invocation.option_value("model");

    match check_target(catalog, &target, model.as_deref()).await {
        Ok(check) => match check.missing_model {
            Some(model) => {
                tracing::warn!(
                    url = %target,
                    %model,
                    available = check.models.len(),
                    "target does not list the requested model"
                );
                Outcome::MissingModel { model }
            }
            None => {
                tracing::info!(url = %target, models = check.models.len(), "preflight passed");
                Outcome::Passed {
                    models: check.models.len(),
                }
            }
        },
        Err(err) if err.is_unauthorized() => {
            tracing::warn!(url = %target, error = %err, "target rejected the API key");
            Outcome::Failed(err)
        }
        Err(err) => {
            tracing::warn!(url = %target, error = %err, "preflight failed; continuing");
            Outcome::Failed(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use backend::ModelInfo;

    use super::*;

    /// Serves a fixed result and records the base URLs it was asked for.
    struct FixedCatalog {
        result: Result<Vec<ModelInfo>, DiscoveryError>,
        asked: Mutex<Vec<String>>,
    }

    impl FixedCatalog {
        fn new(result: Result<Vec<ModelInfo>, DiscoveryError>) -> Self {
            Self {
                result,
                asked: Mutex::new(Vec::new()),
            }
        }

        fn serving(ids: &[&str]) -> Self {
            Self::new(Ok(ids
                .iter()
                .map(|id| ModelInfo {
                    id: (*id).to_owned(),
                    ..ModelInfo::default()
                })
                .collect()))
        }
    }

    #[async_trait]
    impl ModelCatalog for FixedCatalog {
        async fn list_models(&self, base_url: &str) -> Result<Vec<ModelInfo>, DiscoveryError> {
            self.asked.lock().unwrap().push(base_url.to_owned());
            self.result.clone()
        }
    }

    #[tokio::test]
    async fn skipped_without_target() {
        let catalog = FixedCatalog::serving(&["m"]);

        let outcome = run(&catalog, &Invocation::new(["-c", "exit 2"])).await;

        assert_eq!(outcome, Outcome::Skipped);
        assert!(catalog.asked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn passes_when_model_is_listed() {
        let catalog = FixedCatalog::serving(&["org/m", "other"]);
        let invocation = Invocation::new([
            "benchmark",
            "--target",
            "http://gw:8000",
            "--model",
            "org/m",
        ]);

        let outcome = run(&catalog, &invocation).await;

        assert_eq!(outcome, Outcome::Passed { models: 2 });
        assert_eq!(*catalog.asked.lock().unwrap(), vec!["http://gw:8000"]);
    }

    #[tokio::test]
    async fn reports_unlisted_model() {
        let catalog = FixedCatalog::serving(&["other"]);
        let invocation = Invocation::new(["--target=http://gw", "--model=org/m"]);

        let outcome = run(&catalog, &invocation).await;

        assert_eq!(
            outcome,
            Outcome::MissingModel {
                model: "org/m".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn failures_are_reported_not_raised() {
        let err = DiscoveryError::Status {
            url: "http://gw/v1/models".to_owned(),
            status: 401,
            body: String::new(),
        };
        let catalog = FixedCatalog::new(Err(err.clone()));

        let outcome = run(&catalog, &Invocation::new(["--target", "http://gw"])).await;

        assert_eq!(outcome, Outcome::Failed(err));
    }
}
