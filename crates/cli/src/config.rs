//! Launcher configuration.
//!
//! Resolution order, later sources winning:
//!
//! 1. built-in defaults;
//! 2. the TOML file named by `GUIDELLM_AUTH_CONFIG`, if set;
//! 3. `GUIDELLM_AUTH_*` environment variables.
//!
//! The launcher takes no command-line flags of its own: every argument belongs
//! to the delegated tool.
//!
//! ```toml
//! program = "/opt/guidellm/bin/guidellm"
//! api_key_env = "OPENAI_API_KEY"
//! headers_env = "GUIDELLM__OPENAI__HEADERS"
//! require_api_key = false
//! preflight = true
//!
//! [backend]
//! http2 = true
//! timeout_secs = 60.0
//! follow_redirects = true
//! verify = false
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use backend::{
    startup_from_env, BackendSettings, BackendStartup, EnvVarName, DEFAULT_API_KEY_ENV,
    DEFAULT_HEADERS_ENV,
};
use launcher::DEFAULT_PROGRAM;
use serde::Deserialize;
use thiserror::Error;

/// Names the optional TOML configuration file.
pub const CONFIG_PATH_ENV: &str = "GUIDELLM_AUTH_CONFIG";

const PROGRAM_ENV: &str = "GUIDELLM_AUTH_PROGRAM";
const API_KEY_ENV_ENV: &str = "GUIDELLM_AUTH_API_KEY_ENV";
const HEADERS_ENV_ENV: &str = "GUIDELLM_AUTH_HEADERS_ENV";
const REQUIRE_API_KEY_ENV: &str = "GUIDELLM_AUTH_REQUIRE_API_KEY";
const PREFLIGHT_ENV: &str = "GUIDELLM_AUTH_PREFLIGHT";
const HTTP2_ENV: &str = "GUIDELLM_AUTH_HTTP2";
const TIMEOUT_SECS_ENV: &str = "GUIDELLM_AUTH_TIMEOUT_SECS";
const FOLLOW_REDIRECTS_ENV: &str = "GUIDELLM_AUTH_FOLLOW_REDIRECTS";
const VERIFY_ENV: &str = "GUIDELLM_AUTH_VERIFY";

/// Errors produced while resolving the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File named by `GUIDELLM_AUTH_CONFIG`.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or has unknown keys.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// File named by `GUIDELLM_AUTH_CONFIG`.
        path: PathBuf,
        /// Parser diagnostic.
        #[source]
        source: toml::de::Error,
    },

    /// A value violates an invariant (empty program, non-positive timeout).
    #[error("invalid configuration: {message}")]
    Invalid {
        /// Which value is invalid and why.
        message: String,
    },

    /// `require_api_key` is set but the key variable is unset or empty.
    #[error("an API key is required but {var} is not set")]
    MissingApiKey {
        /// Variable the key was read from.
        var: String,
    },
}

/// Top-level launcher configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LaunchConfig {
    /// Program control is delegated to.
    pub program: PathBuf,
    /// Environment variable holding the bearer token.
    pub api_key_env: String,
    /// Environment variable the client's headers are exported to the
    /// delegated tool under.
    pub headers_env: String,
    /// Fail instead of starting an unauthenticated backend.
    pub require_api_key: bool,
    /// List the target's models before delegating, when a `--target` is given.
    pub preflight: bool,
    /// HTTP backend transport settings.
    pub backend: BackendConfig,
}

/// `[backend]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    /// Negotiate HTTP/2 when the server offers it.
    pub http2: bool,
    /// Per-request timeout in seconds; must be positive.
    pub timeout_secs: f64,
    /// Follow HTTP redirects.
    pub follow_redirects: bool,
    /// Verify the server's TLS certificate.
    pub verify: bool,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            api_key_env: DEFAULT_API_KEY_ENV.to_owned(),
            headers_env: DEFAULT_HEADERS_ENV.to_owned(),
            require_api_key: false,
            preflight: true,
            backend: BackendConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        let settings = BackendSettings::default();
        Self {
            http2: settings.http2,
            timeout_secs: settings.timeout.as_secs_f64(),
            follow_redirects: settings.follow_redirects,
            verify: settings.verify,
        }
    }
}

impl LaunchConfig {
    /// Resolves the configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Resolves the configuration using `lookup` in place of the environment.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML configuration file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Applies `GUIDELLM_AUTH_*` overrides. Unparseable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup(PROGRAM_ENV).filter(|v| !v.is_empty()) {
            self.program = PathBuf::from(v);
        }
        if let Some(v) = lookup(API_KEY_ENV_ENV).filter(|v| !v.is_empty()) {
            self.api_key_env = v;
        }
        if let Some(v) = lookup(HEADERS_ENV_ENV).filter(|v| !v.is_empty()) {
            self.headers_env = v;
        }
        if let Some(v) = parse_bool(REQUIRE_API_KEY_ENV, lookup(REQUIRE_API_KEY_ENV)) {
            self.require_api_key = v;
        }
        if let Some(v) = parse_bool(PREFLIGHT_ENV, lookup(PREFLIGHT_ENV)) {
            self.preflight = v;
        }
        if let Some(v) = parse_bool(HTTP2_ENV, lookup(HTTP2_ENV)) {
            self.backend.http2 = v;
        }
        if let Some(v) = lookup(TIMEOUT_SECS_ENV) {
            match v.parse::<f64>() {
                Ok(secs) if valid_timeout(secs) => self.backend.timeout_secs = secs,
                _ => tracing::warn!("ignoring invalid {TIMEOUT_SECS_ENV} value: {v}"),
            }
        }
        if let Some(v) = parse_bool(FOLLOW_REDIRECTS_ENV, lookup(FOLLOW_REDIRECTS_ENV)) {
            self.backend.follow_redirects = v;
        }
        if let Some(v) = parse_bool(VERIFY_ENV, lookup(VERIFY_ENV)) {
            self.backend.verify = v;
        }
    }

    /// Checks invariants that file values may violate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.program.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                message: "program must not be empty".to_owned(),
            });
        }
        if self.api_key_env.is_empty() {
            return Err(ConfigError::Invalid {
                message: "api_key_env must not be empty".to_owned(),
            });
        }
        if self.headers_env.is_empty() {
            return Err(ConfigError::Invalid {
                message: "headers_env must not be empty".to_owned(),
            });
        }
        let timeout = self.backend.timeout_secs;
        if !valid_timeout(timeout) {
            return Err(ConfigError::Invalid {
                message: format!("backend.timeout_secs must be positive, got {timeout}"),
            });
        }
        Ok(())
    }

    /// Backend transport settings.
    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            http2: self.backend.http2,
            timeout: Duration::try_from_secs_f64(self.backend.timeout_secs)
                .unwrap_or_else(|_| BackendSettings::default().timeout),
            follow_redirects: self.backend.follow_redirects,
            verify: self.backend.verify,
        }
    }

    /// The variable the client's headers are exported to the delegated tool
    /// under.
    pub fn headers_env(&self) -> Result<EnvVarName, ConfigError> {
        EnvVarName::new(self.headers_env.clone()).ok_or_else(|| ConfigError::Invalid {
            message: "headers_env must not be empty".to_owned(),
        })
    }

    /// Selects the backend startup variant from the configured variable.
    pub fn startup(&self) -> Result<Box<dyn BackendStartup>, ConfigError> {
        self.check_startup(startup_from_env(&self.api_key_env))
    }

    /// Enforces `require_api_key` on an already selected startup variant.
    pub fn check_startup(
        &self,
        startup: Box<dyn BackendStartup>,
    ) -> Result<Box<dyn BackendStartup>, ConfigError> {
        if startup.api_key().is_none() {
            if self.require_api_key {
                return Err(ConfigError::MissingApiKey {
                    var: self.api_key_env.clone(),
                });
            }
            tracing::warn!(
                var = %self.api_key_env,
                "no API key set; requests will be sent without an Authorization header"
            );
        }
        Ok(startup)
    }
}

fn valid_timeout(secs: f64) -> bool {
    secs > 0.0 && Duration::try_from_secs_f64(secs).is_ok()
}

fn parse_bool(var: &str, value: Option<String>) -> Option<bool> {
    let value = value?;
    match value.parse::<bool>() {
        Ok(b) => Some(b),
        Err(_) => {
            tracing::warn!("ignoring invalid {var} value: {value}");
            None
        }
    }
}
