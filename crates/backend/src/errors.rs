//! Error types for the backend lifecycle and CLI delegation.
//!
//! [`StartupError`] covers the one-shot client construction performed by
//! [`crate::HttpBackend::process_startup`]. [`LaunchError`] covers running the
//! delegated tool. [`DelegationError`] is the union returned by
//! [`crate::start_and_delegate`]. [`DiscoveryError`] covers listing the models
//! an endpoint serves.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Startup errors
// ---------------------------------------------------------------------------

/// Errors produced while starting a backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartupError {
    /// Startup was invoked on a backend that is already in process.
    ///
    /// No client is constructed and the existing client is left in place.
    #[error("Backend already started up for process")]
    AlreadyStarted,

    /// Delegation was requested before the backend was started.
    #[error("Backend has not been started")]
    NotStarted,

    /// The HTTP client could not be built from the requested configuration.
    ///
    /// Produced by [`crate::ClientFactory`] implementations (invalid header
    /// values, TLS backend initialisation failures).
    #[error("HTTP client construction failed: {message}")]
    ClientConstruction {
        /// Description of the underlying failure.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Launch errors
// ---------------------------------------------------------------------------

/// Errors produced while running the delegated command-line tool.
///
/// A non-zero exit status is **not** an error; it is returned as an
/// [`crate::ExitCode`] and propagated unchanged.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The program could not be started (not found, not executable).
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        /// Program that was being started.
        program: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The program started but its exit status could not be collected.
    #[error("Failed to wait for '{program}': {source}")]
    Wait {
        /// Program that was being waited on.
        program: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The request headers could not be encoded for the program's environment.
    #[error("Failed to encode request headers for '{program}': {message}")]
    Encode {
        /// Program the headers were meant for.
        program: String,
        /// Description of the encoding failure.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Delegation errors
// ---------------------------------------------------------------------------

/// Errors returned by [`crate::start_and_delegate`].
#[derive(Debug, Error)]
pub enum DelegationError {
    /// The backend could not be started; the entry point was not invoked.
    #[error(transparent)]
    Startup(#[from] StartupError),

    /// The entry point could not be run.
    #[error(transparent)]
    Launch(#[from] LaunchError),
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors produced while listing the models an endpoint serves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// The request could not be sent or no response was received.
    #[error("Failed to fetch models from {url}: {message}")]
    Request {
        /// Models URL that was requested.
        url: String,
        /// Description of the transport failure.
        message: String,
    },

    /// The endpoint answered with a non-success status.
    #[error("Unexpected status {status} from {url}: {body}")]
    Status {
        /// Models URL that was requested.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body, as returned by the endpoint.
        body: String,
    },

    /// The response body was not a model list.
    #[error("Failed to decode model list from {url}: {message}")]
    Decode {
        /// Models URL that was requested.
        url: String,
        /// Description of the decoding failure.
        message: String,
    },
}

impl DiscoveryError {
    /// Returns `true` when the endpoint rejected the request's credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}
