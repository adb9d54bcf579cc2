//! guidellm-auth HTTP client adapter.
//!
//! Implements the [`backend::ClientFactory`] trait with [`reqwest`]. Every
//! field of a [`backend::ClientSpec`] is mapped onto
//! [`reqwest::ClientBuilder`]:
//!
//! | Spec field | reqwest setting |
//! |------------|-----------------|
//! | `headers` | `default_headers` (`Authorization` marked sensitive) |
//! | `settings.http2` | ALPN negotiation when `true`, `http1_only` when `false` |
//! | `settings.timeout` | `timeout` |
//! | `settings.follow_redirects` | `redirect::Policy::limited(20)` / `Policy::none()` |
//! | `settings.verify` | `danger_accept_invalid_certs(!verify)` |
//! | `limits.keepalive_expiry` | `pool_idle_timeout` |
//! | `limits.max_keepalive_connections` | `pool_max_idle_per_host` |
//!
//! [`ReqwestModelCatalog`] implements [`backend::ModelCatalog`] on top of a
//! client built this way, so model listings are fetched with the same headers
//! the benchmark will send.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** The [`backend`] crate sees only
//! [`backend::ClientFactory`] and [`backend::ModelCatalog`].

use async_trait::async_trait;
use backend::{
    models_url, ClientFactory, ClientSpec, DiscoveryError, ModelCatalog, ModelInfo, ModelList,
    RequestHeaders, StartupError, AUTHORIZATION,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::redirect::Policy;

/// Maximum redirect hops followed when redirects are enabled.
pub const MAX_REDIRECTS: usize = 20;

/// Builds `reqwest` clients for backend startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestClientFactory;

impl ReqwestClientFactory {
    /// Creates a factory.
    pub fn new() -> Self {
        Self
    }

    /// Builds a client synchronously. [`ClientFactory::build`] delegates here.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::ClientConstruction`] for invalid header names or
    /// values, or if the TLS backend cannot be initialised.
    pub fn build_client(&self, spec: &ClientSpec) -> Result<reqwest::Client, StartupError> {
        let headers = header_map(&spec.headers)?;

        let redirect = if spec.settings.follow_redirects {
            Policy::limited(MAX_REDIRECTS)
        } else {
            Policy::none()
        };

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(spec.settings.timeout)
            .redirect(redirect)
            .danger_accept_invalid_certs(!spec.settings.verify)
            .pool_idle_timeout(spec.limits.keepalive_expiry)
            .pool_max_idle_per_host(spec.limits.max_keepalive_connections.unwrap_or(usize::MAX));

        if !spec.settings.http2 {
            builder = builder.http1_only();
        }

        // reqwest opens as many connections as there are in-flight requests.
        if let Some(max) = spec.limits.max_connections {
            tracing::warn!(max, "total connection cap is not enforced by the reqwest client");
        }

        builder
            .build()
            .map_err(|e| StartupError::ClientConstruction {
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl ClientFactory for ReqwestClientFactory {
    type Client = reqwest::Client;

    async fn build(&self, spec: &ClientSpec) -> Result<reqwest::Client, StartupError> {
        self.build_client(spec)
    }
}

/// Lists models through a started backend's client.
#[derive(Debug, Clone)]
pub struct ReqwestModelCatalog {
    client: reqwest::Client,
}

impl ReqwestModelCatalog {
    /// Creates a catalog that sends its requests with `client`.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ModelCatalog for ReqwestModelCatalog {
    async fn list_models(&self, base_url: &str) -> Result<Vec<ModelInfo>, DiscoveryError> {
        let url = models_url(base_url);
        tracing::info!(%url, "discovering models");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| DiscoveryError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiscoveryError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        let list: ModelList = response.json().await.map_err(|e| DiscoveryError::Decode {
            url: url.clone(),
            message: e.to_string(),
        })?;

        tracing::info!(%url, count = list.data.len(), "discovered models");
        Ok(list.data)
    }
}

fn header_map(headers: &RequestHeaders) -> Result<HeaderMap, StartupError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| StartupError::ClientConstruction {
                message: format!("invalid header name '{name}': {e}"),
            })?;
        let mut header_value =
            HeaderValue::from_str(value).map_err(|_| StartupError::ClientConstruction {
                message: format!("invalid value for header '{name}'"),
            })?;
        if name.eq_ignore_ascii_case(AUTHORIZATION) {
            header_value.set_sensitive(true);
        }
        map.insert(header_name, header_value);
    }
    Ok(map)
}
