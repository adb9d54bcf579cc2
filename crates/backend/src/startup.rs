//! Backend startup capability.
//!
//! How a backend's HTTP client is configured at startup is injected as a
//! [`BackendStartup`] value rather than patched into a shared type:
//!
//! - [`DefaultStartup`]: no extra headers.
//! - [`AuthenticatedStartup`]: adds `Authorization: Bearer <key>`.
//!
//! Both variants copy the backend's [`BackendSettings`] verbatim and apply
//! [`ConnectionLimits::unbounded`]. Constructing the actual client is delegated
//! to a [`ClientFactory`] implemented by an infrastructure crate.

use async_trait::async_trait;

use crate::{
    ApiKey, BackendSettings, ClientSpec, ConnectionLimits, RequestHeaders, StartupError,
    AUTHORIZATION,
};

/// Environment variable read for the bearer token unless configured otherwise.
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable through which the client's headers reach the
/// benchmarking tool, encoded as a JSON object.
pub const DEFAULT_HEADERS_ENV: &str = "GUIDELLM__OPENAI__HEADERS";

// ---------------------------------------------------------------------------
// Startup capability
// ---------------------------------------------------------------------------

/// Decides how the backend's client is configured when it starts.
pub trait BackendStartup: Send + Sync + std::fmt::Debug {
    /// Returns the headers every request made by the client carries.
    fn headers(&self) -> RequestHeaders;

    /// Returns the key this startup authenticates with, if any.
    ///
    /// Used to report and enforce whether the backend is authenticated.
    fn api_key(&self) -> Option<&ApiKey> {
        None
    }

    /// Builds the complete client specification for a backend with `settings`.
    fn client_spec(&self, settings: &BackendSettings) -> ClientSpec {
        ClientSpec {
            settings: *settings,
            headers: self.headers(),
            limits: ConnectionLimits::unbounded(),
        }
    }
}

/// Startup without authentication.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStartup;

impl BackendStartup for DefaultStartup {
    fn headers(&self) -> RequestHeaders {
        RequestHeaders::new()
    }
}

/// Startup that authenticates every request with a bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedStartup {
    api_key: ApiKey,
}

impl AuthenticatedStartup {
    /// Creates an authenticated startup for `api_key`.
    pub fn new(api_key: ApiKey) -> Self {
        Self { api_key }
    }
}

impl BackendStartup for AuthenticatedStartup {
    fn headers(&self) -> RequestHeaders {
        let mut headers = RequestHeaders::new();
        headers.insert(AUTHORIZATION, self.api_key.bearer_header_value());
        headers
    }

    fn api_key(&self) -> Option<&ApiKey> {
        Some(&self.api_key)
    }
}

/// Chooses the startup variant for a raw token value.
///
/// A missing or empty value selects [`DefaultStartup`]; the resulting client
/// sends no `Authorization` header at all.
pub fn select_startup(raw_key: Option<String>) -> Box<dyn BackendStartup> {
    match raw_key.and_then(ApiKey::new) {
        Some(key) => Box::new(AuthenticatedStartup::new(key)),
        None => Box::new(DefaultStartup),
    }
}

/// Reads the token from the environment variable `var` and selects the
/// startup variant for it.
pub fn startup_from_env(var: &str) -> Box<dyn BackendStartup> {
    let raw = std::env::var(var).ok();
    if raw.as_deref().map_or(true, str::is_empty) {
        tracing::debug!(var, "no API key in environment");
    }
    select_startup(raw)
}

// ---------------------------------------------------------------------------
// Client factory port
// ---------------------------------------------------------------------------

/// Constructs the asynchronous HTTP client described by a [`ClientSpec`].
///
/// Implemented by the `transport` crate for `reqwest`; tests use recording
/// fakes.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// The client type produced.
    type Client: Send + Sync;

    /// Builds a client for `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::ClientConstruction`] if the client cannot be
    /// built.
    async fn build(&self, spec: &ClientSpec) -> Result<Self::Client, StartupError>;
}
