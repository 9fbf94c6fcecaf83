//! Account directory error types.

use thiserror::Error;

use shopfront_core::{CredentialError, EmailError};

use crate::storage::StorageError;

/// Errors that can occur during account directory operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Invalid credentials (wrong password, unknown or inactive account).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The persisted directory could not be parsed.
    #[error("account directory is corrupt: {0}")]
    CorruptDirectory(serde_json::Error),

    /// Issuing a credential failed.
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
