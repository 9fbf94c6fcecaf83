//! Accounts held by the mock directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopfront_core::{Email, UserId};

/// A registered account.
///
/// Stands in for a backend user table; the whole directory is one JSON array
/// under `ecommerce_users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub dni: String,
    /// Issuer-cased role name (`"user"`, `"admin"`).
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}
