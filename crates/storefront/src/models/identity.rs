//! Resolved identity of the current user.

use serde::{Deserialize, Serialize};

use shopfront_core::{Email, Role, UserId};

/// The logged-in user as seen by the rest of the application.
///
/// Owned by the session manager; everyone else gets a shared reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Subject ID from the credential.
    pub id: UserId,
    /// Unique key of the identity; carts and orders are stored under it.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Surname, empty when unknown.
    pub surname: String,
    /// National ID (DNI), empty when unknown.
    pub national_id: String,
    /// Avatar reference (URL or data URI).
    pub avatar: Option<String>,
    /// Upper-cased roles. Always has at least one entry.
    pub roles: Vec<Role>,
}

impl Identity {
    /// Whether the identity holds `role` (case-insensitive).
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        let role = Role::new(role);
        self.roles.contains(&role)
    }

    /// Name and surname joined for display.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.surname.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.surname)
        }
    }
}
