//! Unified error handling with Sentry integration.
//!
//! Session and cart operations never fail outward: they log and fall back to
//! a safe state. The fallible edges (account directory, checkout, storage
//! setup, configuration) each have their own error enum; `AppError` unifies
//! them for callers such as the CLI, and [`AppError::report`] captures the
//! unexpected ones to Sentry.

use thiserror::Error;

use shopfront_core::CredentialError;

use crate::config::ConfigError;
use crate::services::accounts::AuthError;
use crate::services::orders::CheckoutError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Credential could not be decoded.
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Account directory operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout was rejected.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The user is not logged in.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad input from the caller.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this error points at a defect or broken environment rather
    /// than a user mistake.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        matches!(
            self,
            Self::Storage(_)
                | Self::Config(_)
                | Self::Auth(AuthError::Storage(_) | AuthError::PasswordHash)
                | Self::Checkout(CheckoutError::Storage(_) | CheckoutError::CorruptHistory(_))
        )
    }

    /// Log the error, capturing unexpected ones to Sentry.
    pub fn report(&self) {
        if self.is_unexpected() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command error"
            );
        } else {
            tracing::warn!(error = %self, "Command rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Called whenever an identity is established (login or restore).
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Called on logout and when a stored credential is rejected.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust
/// shopfront_storefront::error::add_breadcrumb("cart", "Added item", Some(&[("product_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
