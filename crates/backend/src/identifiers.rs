//! Newtype identifiers.
//!
//! Values that carry identity (an invocation, an environment variable name, a
//! generated key) are distinct newtypes so that, for example, a [`KeyId`] can
//! never be passed where an [`EnvVarName`] is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single launcher invocation.
///
/// Generated fresh for every process; recorded on the root tracing span so all
/// activity from one benchmark launch can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaunchId(Uuid);

impl LaunchId {
    /// Generates a new random launch identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for LaunchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// Name of a process environment variable (e.g. `"OPENAI_API_KEY"`).
    EnvVarName
}

impl EnvVarName {
    /// The variable the benchmarking tool reads extra OpenAI request headers
    /// from, as a JSON object.
    pub fn openai_headers() -> Self {
        Self(crate::DEFAULT_HEADERS_ENV.to_owned())
    }
}

string_id! {
    /// Short public identifier of a generated API key.
    ///
    /// Derived from the first bytes of the key secret; safe to log and store.
    KeyId
}

impl KeyId {
    /// Wraps an encoded key id. Callers guarantee the value is non-empty.
    pub(crate) fn from_encoded(value: String) -> Self {
        Self(value)
    }
}

string_id! {
    /// SHA-256 fingerprint of a full API key token, URL-safe base64 encoded.
    ///
    /// The gateway stores fingerprints, never tokens.
    Fingerprint
}

impl Fingerprint {
    /// Wraps an encoded digest. Callers guarantee the value is non-empty.
    pub(crate) fn from_encoded(value: String) -> Self {
        Self(value)
    }
}
