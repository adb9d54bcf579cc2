//! API key handling.
//!
//! [`ApiKey`] wraps the bearer token read from the environment; its `Debug` and
//! `Display` output never reveal the token. [`GeneratedKey`] produces new
//! gateway keys in the `ai-aas_<key_id>_<secret>` format together with the
//! fingerprint the gateway stores.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::{Fingerprint, KeyId};

/// Prefix of every generated gateway token.
pub const KEY_PREFIX: &str = "ai-aas";

/// Number of random bytes in a generated key secret.
const SECRET_LEN: usize = 32;

/// Number of leading secret bytes encoded into the public key id.
const KEY_ID_LEN: usize = 6;

// ---------------------------------------------------------------------------
// ApiKey
// ---------------------------------------------------------------------------

/// A non-empty bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates an [`ApiKey`], returning `None` for an empty string.
    ///
    /// An empty environment variable is treated exactly like an unset one.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.is_empty() {
            None
        } else {
            Some(Self(v))
        }
    }

    /// Returns the raw token.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns the `Authorization` header value for this key.
    pub fn bearer_header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

// ---------------------------------------------------------------------------
// Key generation
// ---------------------------------------------------------------------------

/// A freshly generated gateway API key.
///
/// The token is shown to the operator once; only the [`KeyId`] and
/// [`Fingerprint`] are persisted by the gateway.
#[derive(Debug, Clone)]
pub struct GeneratedKey {
    token: ApiKey,
    key_id: KeyId,
    fingerprint: Fingerprint,
}

impl GeneratedKey {
    /// Generates a key from 32 bytes of operating-system randomness.
    pub fn generate() -> Self {
        let mut secret = [0u8; SECRET_LEN];
        rand::rngs::OsRng.fill_bytes(&mut secret);
        Self::from_secret(&secret)
    }

    /// Derives the token, key id and fingerprint from an explicit secret.
    pub fn from_secret(secret: &[u8; SECRET_LEN]) -> Self {
        let key_id = URL_SAFE_NO_PAD.encode(&secret[..KEY_ID_LEN]);
        let token = format!(
            "{KEY_PREFIX}_{key_id}_{}",
            URL_SAFE_NO_PAD.encode(secret)
        );
        let fingerprint = fingerprint(&token);

        Self {
            token: ApiKey(token),
            key_id: KeyId::from_encoded(key_id),
            fingerprint,
        }
    }

    /// Returns the full token.
    pub fn token(&self) -> &ApiKey {
        &self.token
    }

    /// Returns the public key id.
    pub fn key_id(&self) -> &KeyId {
        &self.key_id
    }

    /// Returns the fingerprint of the token.
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}

/// Computes the fingerprint the gateway stores for `token`: SHA-256, URL-safe
/// base64 without padding.
pub fn fingerprint(token: &str) -> Fingerprint {
    let digest = Sha256::digest(token.as_bytes());
    Fingerprint::from_encoded(URL_SAFE_NO_PAD.encode(digest))
}
