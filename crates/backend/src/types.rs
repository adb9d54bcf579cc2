//! Shared value types for the backend domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! configuration values with invariants (timeouts are positive, the
//! `Authorization` header is never present with an empty value) and flow
//! between the startup capability and the client factory.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

/// Name of the header that carries the bearer token.
pub const AUTHORIZATION: &str = "Authorization";

// ---------------------------------------------------------------------------
// Backend settings
// ---------------------------------------------------------------------------

/// Transport settings held by a backend before startup.
///
/// Copied verbatim into every [`ClientSpec`] the backend requests, whichever
/// [`crate::BackendStartup`] variant is in use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackendSettings {
    /// Negotiate HTTP/2 when the server offers it.
    pub http2: bool,
    /// Total timeout applied to each request.
    pub timeout: Duration,
    /// Follow HTTP redirects.
    pub follow_redirects: bool,
    /// Verify the server's TLS certificate.
    pub verify: bool,
}

impl Default for BackendSettings {
    /// Matches the benchmarking tool's own OpenAI backend defaults.
    fn default() -> Self {
        Self {
            http2: true,
            timeout: Duration::from_secs(60),
            follow_redirects: true,
            verify: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Connection limits
// ---------------------------------------------------------------------------

/// Connection pool policy handed to the client factory.
///
/// `None` means unbounded. The backend never enforces these values itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionLimits {
    /// Maximum number of concurrent connections.
    pub max_connections: Option<usize>,
    /// Maximum number of idle keep-alive connections.
    pub max_keepalive_connections: Option<usize>,
    /// How long an idle connection is kept before it is closed.
    pub keepalive_expiry: Duration,
}

impl ConnectionLimits {
    /// Idle expiry used by [`ConnectionLimits::unbounded`].
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(5);

    /// The fixed policy used at startup: no connection caps, 5 second idle expiry.
    ///
    /// A benchmark drives as many concurrent requests as its profile asks for;
    /// capping the pool would skew the measured throughput.
    pub fn unbounded() -> Self {
        Self {
            max_connections: None,
            max_keepalive_connections: None,
            keepalive_expiry: Self::KEEPALIVE_EXPIRY,
        }
    }
}

// ---------------------------------------------------------------------------
// Request headers
// ---------------------------------------------------------------------------

/// Default headers attached to every request made by the constructed client.
///
/// Header names are compared case-insensitively. The `Debug` output redacts
/// the value of [`AUTHORIZATION`]; the serialized form (a flat JSON object of
/// name to value) does not, since it is what hands the headers to the
/// delegated tool.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequestHeaders(BTreeMap<String, String>);

impl RequestHeaders {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a header, replacing any existing header with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.0.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        self.0.insert(name, value.into());
    }

    /// Returns the value of the named header, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` if the named header is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of headers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no headers are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for RequestHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.0 {
            if name.eq_ignore_ascii_case(AUTHORIZATION) {
                map.entry(name, &"[REDACTED]");
            } else {
                map.entry(name, value);
            }
        }
        map.finish()
    }
}

// ---------------------------------------------------------------------------
// Client specification
// ---------------------------------------------------------------------------

/// Everything a [`crate::ClientFactory`] needs to construct the backend's
/// asynchronous HTTP client.
///
/// Created once per backend startup and passed to the factory by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSpec {
    /// Transport settings copied from the backend.
    pub settings: BackendSettings,
    /// Default headers for every request.
    pub headers: RequestHeaders,
    /// Connection pool policy.
    pub limits: ConnectionLimits,
}

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

/// Exit status reported by the delegated command-line tool.
///
/// Propagated unchanged as the launcher's own exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Successful termination.
    pub const SUCCESS: Self = Self(0);

    /// Creates an [`ExitCode`] from a raw status value.
    pub fn new(code: i32) -> Self {
        Self(code)
    }

    /// Exit code for a process terminated by `signal`, following the shell
    /// convention of `128 + signal`.
    pub fn from_signal(signal: i32) -> Self {
        Self(128 + signal)
    }

    /// Returns the raw status value.
    pub fn as_i32(self) -> i32 {
        self.0
    }

    /// Returns `true` for a zero status.
    pub fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
