//! Model discovery.
//!
//! An OpenAI-compatible endpoint lists the models it serves at `/v1/models`.
//! Listing them through the backend's authenticated client tells the operator,
//! before a benchmark starts, whether the gateway accepts the key and whether
//! the requested model is served. The listed text models can also be turned
//! into benchmark [`Target`]s.
//!
//! Fetching the list is I/O and lives behind the [`ModelCatalog`] port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::DiscoveryError;

/// `model_type` of models that generate text.
pub const TEXT_MODEL_TYPE: &str = "text";

/// One entry of an OpenAI-compatible `/v1/models` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelInfo {
    /// Model identifier passed as `--model` to the benchmarking tool.
    pub id: String,
    /// Object kind, `"model"` for well-formed entries.
    pub object: String,
    /// Creation time, seconds since the Unix epoch.
    pub created: i64,
    /// Owning organisation.
    pub owned_by: String,
    /// Model family, e.g. `"text"` or `"vision-language"`. Gateway extension;
    /// empty when the endpoint does not report it.
    pub model_type: String,
}

impl ModelInfo {
    /// Returns `true` for text generation models.
    pub fn is_text(&self) -> bool {
        self.model_type == TEXT_MODEL_TYPE
    }
}

/// Body of a `/v1/models` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelList {
    /// Object kind, `"list"`.
    pub object: String,
    /// Listed models.
    pub data: Vec<ModelInfo>,
}

/// A benchmark target derived from a discovered model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    /// Name safe for use in labels and file names.
    pub name: String,
    /// Base URL passed as `--target`.
    pub url: String,
    /// Model identifier passed as `--model`.
    pub model: String,
}

/// Lists the models served by an endpoint.
#[async_trait]
pub trait ModelCatalog: Send + Sync {
    /// Fetches the model list for the endpoint at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] if the request fails, the endpoint answers
    /// with a non-success status, or the body is not a model list.
    async fn list_models(&self, base_url: &str) -> Result<Vec<ModelInfo>, DiscoveryError>;
}

/// Returns the models URL for a target base URL.
///
/// Both `https://host` and `https://host/v1` resolve to
/// `https://host/v1/models`.
pub fn models_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/v1") {
        format!("{base}/models")
    } else {
        format!("{base}/v1/models")
    }
}

/// Keeps only text generation models.
pub fn filter_text_models(models: Vec<ModelInfo>) -> Vec<ModelInfo> {
    models.into_iter().filter(ModelInfo::is_text).collect()
}

/// Turns a model id into a target name: `/` becomes `-`, and leading or
/// trailing `-` are dropped.
///
/// `unsloth/gpt-oss-20b` becomes `unsloth-gpt-oss-20b`.
pub fn normalize_model_name(model_id: &str) -> String {
    model_id.replace('/', "-").trim_matches('-').to_owned()
}

/// Builds one benchmark target per model, all pointing at `base_url`.
pub fn generate_targets(models: &[ModelInfo], base_url: &str) -> Vec<Target> {
    models
        .iter()
        .map(|model| Target {
            name: normalize_model_name(&model.id),
            url: base_url.to_owned(),
            model: model.id.clone(),
        })
        .collect()
}

/// Result of checking a target before a benchmark starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCheck {
    /// Every model the endpoint lists.
    pub models: Vec<ModelInfo>,
    /// The requested model, when the endpoint does not list it.
    pub missing_model: Option<String>,
}

/// Lists the models at `base_url` and checks that `model`, if given, is
/// among them.
///
/// # Errors
///
/// Returns the catalog's [`DiscoveryError`] unchanged.
pub async fn check_target<C>(
    catalog: &C,
    base_url: &str,
    model: Option<&str>,
) -> Result<TargetCheck, DiscoveryError>
where
    C: ModelCatalog + ?Sized,
{
    let models = catalog.list_models(base_url).await?;
    let missing_model = model
        .filter(|wanted| !models.iter().any(|m| m.id == *wanted))
        .map(str::to_owned);
    Ok(TargetCheck {
        models,
        missing_model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(id: &str, model_type: &str) -> ModelInfo {
        ModelInfo {
            id: id.to_owned(),
            object: "model".to_owned(),
            model_type: model_type.to_owned(),
            ..ModelInfo::default()
        }
    }

    struct FixedCatalog(Result<Vec<ModelInfo>, DiscoveryError>);

    #[async_trait]
    impl ModelCatalog for FixedCatalog {
        async fn list_models(&self, _base_url: &str) -> Result<Vec<ModelInfo>, DiscoveryError> {
            self.0.clone()
        }
    }

    #[test]
    fn models_url_accepts_bare_and_versioned_bases() {
        assert_eq!(models_url("http://gw:8000"), "http://gw:8000/v1/models");
        assert_eq!(models_url("http://gw:8000/"), "http://gw:8000/v1/models");
        assert_eq!(models_url("http://gw:8000/v1"), "http://gw:8000/v1/models");
        assert_eq!(models_url("http://gw:8000/v1/"), "http://gw:8000/v1/models");
    }

    #[test]
    fn only_text_models_are_kept() {
        let models = vec![
            model("model-1", "text"),
            model("model-2", "vision-language"),
            model("model-3", ""),
        ];

        let text = filter_text_models(models);

        assert_eq!(text.len(), 1);
        assert_eq!(text[0].id, "model-1");
    }

    #[test]
    fn model_names_are_normalized() {
        assert_eq!(normalize_model_name("unsloth/gpt-oss-20b"), "unsloth-gpt-oss-20b");
        assert_eq!(normalize_model_name("/leading/"), "leading");
        assert_eq!(normalize_model_name("plain"), "plain");
    }

    #[test]
    fn targets_point_at_base_url() {
        let targets = generate_targets(
            &[model("org/a", "text"), model("b", "text")],
            "http://gw:8000",
        );

        assert_eq!(
            targets,
            vec![
                Target {
                    name: "org-a".to_owned(),
                    url: "http://gw:8000".to_owned(),
                    model: "org/a".to_owned(),
                },
                Target {
                    name: "b".to_owned(),
                    url: "http://gw:8000".to_owned(),
                    model: "b".to_owned(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn check_reports_missing_model() {
        let catalog = FixedCatalog(Ok(vec![model("served", "text")]));

        let check = check_target(&catalog, "http://gw", Some("absent"))
            .await
            .unwrap();
        assert_eq!(check.missing_model.as_deref(), Some("absent"));

        let check = check_target(&catalog, "http://gw", Some("served"))
            .await
            .unwrap();
        assert!(check.missing_model.is_none());

        let check = check_target(&catalog, "http://gw", None).await.unwrap();
        assert!(check.missing_model.is_none());
        assert_eq!(check.models.len(), 1);
    }

    #[tokio::test]
    async fn check_passes_catalog_errors_through() {
        let catalog = FixedCatalog(Err(DiscoveryError::Status {
            url: "http://gw/v1/models".to_owned(),
            status: 401,
            body: "invalid api key".to_owned(),
        }));

        let err = check_target(&catalog, "http://gw", None).await.unwrap_err();
        assert!(err.is_unauthorized());
    }
}
