//! Account roles.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A role attached to an identity.
///
/// Credentials carry roles in whatever case the issuer used (`"user"`,
/// `"admin"`); identities always expose them upper-cased (`"USER"`). Parsing
/// normalizes, so two roles compare equal regardless of the source casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Role(String);

impl Role {
    /// Name of the generic role assigned when a credential carries none.
    pub const USER: &'static str = "USER";

    /// Create a role, upper-casing the name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_uppercase())
    }

    /// The generic `USER` role.
    #[must_use]
    pub fn user() -> Self {
        Self(Self::USER.to_owned())
    }

    /// Resolve an optional, possibly blank role name, defaulting to `USER`.
    #[must_use]
    pub fn from_claim(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some(name) if !name.is_empty() => Self::new(name),
            _ => Self::user(),
        }
    }

    /// The upper-cased role name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::user()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.0
    }
}
