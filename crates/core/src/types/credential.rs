//! Pseudo-authentication credential.
//!
//! **This is not a security token.** The credential is a convenience capsule:
//! a JSON object `{id, email, role, exp}` that is percent-encoded and then
//! base64-encoded. Nothing is signed or encrypted, so any holder can decode
//! it and anyone can forge one. It exists so the storefront can remember who
//! is logged in between runs without a backend.
//!
//! ```
//! use shopfront_core::{Credential, CredentialClaims, Email, UserId};
//!
//! let claims = CredentialClaims {
//!     id: UserId::new(7),
//!     email: Email::parse("a@b.com").unwrap(),
//!     role: Some("user".to_owned()),
//!     exp: 1_000,
//! };
//! let credential = Credential::issue(&claims).unwrap();
//! assert_eq!(credential.decode().unwrap(), claims);
//! assert!(credential.validate(1_000).is_err()); // exp <= now is expired
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{Email, UserId};

/// Errors produced while decoding or validating a [`Credential`].
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The outer layer is not valid base64.
    #[error("credential is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bytes, or the percent-decoded text, are not UTF-8.
    #[error("credential payload is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The payload is not a JSON claims object.
    #[error("credential payload is not a claims object: {0}")]
    Json(#[from] serde_json::Error),

    /// The claims decoded but `exp` is not in the future.
    #[error("credential expired at {exp}")]
    Expired {
        /// Expiry in epoch milliseconds.
        exp: i64,
    },
}

/// The claims carried inside a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaims {
    /// Subject (account) ID.
    pub id: UserId,
    /// Subject email.
    pub email: Email,
    /// Issuer-cased role name; absent roles resolve to `USER`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Expiry in epoch milliseconds.
    pub exp: i64,
}

impl CredentialClaims {
    /// A credential is expired once `exp <= now`.
    #[must_use]
    pub const fn is_expired(&self, now_millis: i64) -> bool {
        self.exp <= now_millis
    }
}

/// An encoded, unsigned credential string.
///
/// The raw value is kept in a [`SecretString`] so it is redacted from `Debug`
/// output and logs, even though it carries no real secret.
pub struct Credential(SecretString);

impl Credential {
    /// Wrap an already-encoded credential string.
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(SecretString::from(encoded.into()))
    }

    /// Encode claims into a credential.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Json` if the claims cannot be serialized.
    pub fn issue(claims: &CredentialClaims) -> Result<Self, CredentialError> {
        let json = serde_json::to_string(claims)?;
        let escaped = urlencoding::encode(&json);
        Ok(Self::new(STANDARD.encode(escaped.as_bytes())))
    }

    /// Decode the claims without checking expiry.
    ///
    /// # Errors
    ///
    /// Returns a [`CredentialError`] for any malformed layer: base64, UTF-8,
    /// percent-encoding, or JSON.
    pub fn decode(&self) -> Result<CredentialClaims, CredentialError> {
        let bytes = STANDARD.decode(self.0.expose_secret().trim())?;
        let escaped = String::from_utf8(bytes)?;
        let json = urlencoding::decode(&escaped)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Decode the claims and reject them if expired at `now_millis`.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Expired` when `exp <= now_millis`, or any
    /// decoding error from [`Credential::decode`].
    pub fn validate(&self, now_millis: i64) -> Result<CredentialClaims, CredentialError> {
        let claims = self.decode()?;
        if claims.is_expired(now_millis) {
            return Err(CredentialError::Expired { exp: claims.exp });
        }
        Ok(claims)
    }

    /// The encoded string, for persisting.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Credential").field(&"[REDACTED]").finish()
    }
}

impl From<String> for Credential {
    fn from(encoded: String) -> Self {
        Self::new(encoded)
    }
}

impl From<&str> for Credential {
    fn from(encoded: &str) -> Self {
        Self::new(encoded)
    }
}
