//! Session manager: who is logged in.
//!
//! The session is derived from an unsigned [`Credential`] kept under the
//! `token` key, plus display attributes mirrored under `userName`,
//! `userSurname`, `userDni`, `userProfilePhoto` and `userEmail`.
//!
//! Corrupt or expired credentials are never surfaced as errors: the stored
//! identity fields are wiped and the session simply reads as logged out.

use std::sync::Arc;

use shopfront_core::{Credential, CredentialClaims, CredentialError, Email, Role};

use crate::clock::Clock;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::Identity;
use crate::storage::{KeyValueStore, keys};

/// Attributes supplied to [`SessionManager::login`].
///
/// Optional attributes default to empty; a missing or blank email falls back
/// to the one inside the credential.
#[derive(Debug)]
pub struct SessionLogin {
    pub credential: Credential,
    pub display_name: String,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub national_id: Option<String>,
    pub avatar: Option<String>,
}

impl SessionLogin {
    /// Login with only a credential and display name.
    #[must_use]
    pub fn new(credential: Credential, display_name: impl Into<String>) -> Self {
        Self {
            credential,
            display_name: display_name.into(),
            surname: None,
            email: None,
            national_id: None,
            avatar: None,
        }
    }

    #[must_use]
    pub fn with_surname(mut self, surname: impl Into<String>) -> Self {
        self.surname = Some(surname.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_national_id(mut self, national_id: impl Into<String>) -> Self {
        self.national_id = Some(national_id.into());
        self
    }

    #[must_use]
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

/// Single source of truth for the current identity.
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    identity: Option<Identity>,
    restoring: bool,
}

impl SessionManager {
    /// Create a manager that has not yet restored its session.
    ///
    /// [`is_restoring`](Self::is_restoring) reports `true` until
    /// [`restore`](Self::restore) has run.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            identity: None,
            restoring: true,
        }
    }

    /// Rebuild the identity from the stored credential.
    ///
    /// Missing credential: anonymous. Malformed or expired credential: every
    /// identity key is wiped and the session is anonymous. Valid credential:
    /// identity from the claims plus the stored display attributes.
    pub fn restore(&mut self) {
        self.identity = None;

        if let Some(raw) = self.read(keys::TOKEN) {
            let now = self.clock.now_millis();
            match Credential::new(raw).validate(now) {
                Ok(claims) => {
                    let identity = self.identity_from_storage(claims);
                    tracing::info!(user_id = %identity.id, email = %identity.email, "Session restored");
                    set_sentry_user(&identity.id, Some(identity.email.as_str()));
                    self.identity = Some(identity);
                }
                Err(CredentialError::Expired { exp }) => {
                    tracing::info!(exp, now, "Stored credential expired; clearing session");
                    self.clear_storage();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Stored credential is corrupt; clearing session");
                    self.clear_storage();
                }
            }
        }

        if self.restoring {
            self.restoring = false;
            tracing::debug!(authenticated = self.identity.is_some(), "Session restore complete");
        }
    }

    /// Establish a session from a freshly issued credential.
    ///
    /// The credential is decoded before anything is written: on failure the
    /// error is logged and returned, and both storage and the in-memory
    /// identity are left exactly as they were.
    ///
    /// # Errors
    ///
    /// Returns the [`CredentialError`] if the credential cannot be decoded.
    pub fn login(&mut self, login: SessionLogin) -> Result<&Identity, CredentialError> {
        let claims = login.credential.decode().map_err(|e| {
            tracing::warn!(error = %e, "Rejected login with undecodable credential");
            e
        })?;

        let email = match login.email.as_deref().map(str::trim) {
            Some(supplied) if !supplied.is_empty() => Email::parse(supplied).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Supplied email is invalid; using credential email");
                claims.email.clone()
            }),
            _ => claims.email.clone(),
        };

        let identity = Identity {
            id: claims.id,
            email,
            name: login.display_name,
            surname: login.surname.unwrap_or_default(),
            national_id: login.national_id.unwrap_or_default(),
            avatar: login.avatar.filter(|a| !a.is_empty()),
            roles: vec![Role::from_claim(claims.role.as_deref())],
        };

        self.write(keys::TOKEN, login.credential.expose());
        self.write(keys::USER_NAME, &identity.name);
        self.write(keys::USER_SURNAME, &identity.surname);
        self.write(keys::USER_EMAIL, identity.email.as_str());
        self.write(keys::USER_DNI, &identity.national_id);
        self.write(
            keys::USER_PROFILE_PHOTO,
            identity.avatar.as_deref().unwrap_or_default(),
        );

        tracing::info!(user_id = %identity.id, email = %identity.email, "Logged in");
        set_sentry_user(&identity.id, Some(identity.email.as_str()));

        Ok(self.identity.insert(identity))
    }

    /// Forget the session. Safe to call when already logged out.
    pub fn logout(&mut self) {
        if let Some(identity) = self.identity.take() {
            tracing::info!(email = %identity.email, "Logged out");
        }
        self.clear_storage();
        clear_sentry_user();
    }

    /// True iff an identity is loaded *and* a credential is still stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some() && self.read(keys::TOKEN).is_some()
    }

    /// The current identity, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Whether the initial restore is still pending.
    #[must_use]
    pub const fn is_restoring(&self) -> bool {
        self.restoring
    }

    fn identity_from_storage(&self, claims: CredentialClaims) -> Identity {
        let stored = |key: &str| self.read(key).filter(|v| !v.is_empty());

        Identity {
            id: claims.id,
            name: stored(keys::USER_NAME).unwrap_or_else(|| claims.email.to_string()),
            surname: stored(keys::USER_SURNAME).unwrap_or_default(),
            national_id: stored(keys::USER_DNI).unwrap_or_default(),
            avatar: stored(keys::USER_PROFILE_PHOTO),
            roles: vec![Role::from_claim(claims.role.as_deref())],
            email: claims.email,
        }
    }

    fn clear_storage(&self) {
        for key in keys::IDENTITY_KEYS {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!(key, error = %e, "Failed to clear session key");
            }
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "Failed to read session key");
            None
        })
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::error!(key, error = %e, "Failed to persist session key");
        }
    }
}
