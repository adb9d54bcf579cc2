//! Backend domain for guidellm-auth.
//!
//! This crate owns every concept involved in starting an authenticated HTTP
//! backend and handing control to the benchmarking tool: the client
//! configuration, the startup capability, the backend lifecycle, model
//! discovery, and the port traits that infrastructure crates implement.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate performs no network or
//! process I/O. It defines *what* is needed; [`ClientFactory`], [`EntryPoint`]
//! and [`ModelCatalog`] implementations in infrastructure crates define *how*.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`LaunchId`, `EnvVarName`, etc.) |
//! | [`types`] | Value types (`BackendSettings`, `ConnectionLimits`, `ClientSpec`, etc.) |
//! | [`credentials`] | `ApiKey` and API key generation |
//! | [`startup`] | `BackendStartup` capability and the `ClientFactory` port |
//! | [`http_backend`] | `HttpBackend` and its one-shot startup |
//! | [`entry`] | `EntryPoint` port for the delegated CLI |
//! | [`launch`] | `start_and_delegate`, the end-to-end flow |
//! | [`discovery`] | `ModelCatalog` port, model filtering and target generation |
//! | [`errors`] | Error types |

pub mod credentials;
pub mod discovery;
pub mod entry;
pub mod errors;
pub mod http_backend;
pub mod identifiers;
pub mod launch;
pub mod startup;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use credentials::{ApiKey, GeneratedKey, KEY_PREFIX};
pub use discovery::{
    check_target, filter_text_models, generate_targets, models_url, normalize_model_name,
    ModelCatalog, ModelInfo, ModelList, Target, TargetCheck,
};
pub use entry::{EntryPoint, Invocation};
pub use errors::{DelegationError, DiscoveryError, LaunchError, StartupError};
pub use http_backend::HttpBackend;
pub use identifiers::{EnvVarName, Fingerprint, KeyId, LaunchId};
pub use launch::{delegate, start_and_delegate};
pub use startup::{
    select_startup, startup_from_env, AuthenticatedStartup, BackendStartup, ClientFactory,
    DefaultStartup, DEFAULT_API_KEY_ENV, DEFAULT_HEADERS_ENV,
};
pub use types::{
    BackendSettings, ClientSpec, ConnectionLimits, ExitCode, RequestHeaders, AUTHORIZATION,
};
