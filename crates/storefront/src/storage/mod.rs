//! Key/value persistence port.
//!
//! The storefront persists everything as string values under well-known keys,
//! the way a browser's local storage would. The port is injected into every
//! manager so tests can use [`MemoryStore`] while the CLI uses [`FileStore`].
//!
//! # Keys
//!
//! | Key | Owner | Value |
//! |-----|-------|-------|
//! | `token` | session | encoded credential |
//! | `userName`, `userSurname`, `userDni`, `userProfilePhoto`, `userEmail` | session | display attributes |
//! | `cart_<email>` / `cart_guest` | cart | JSON array of line items |
//! | `orders_<email>` | order history | JSON array of orders |
//! | `ecommerce_users` | account directory | JSON array of accounts |

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

use shopfront_core::Email;

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but is not a JSON object of strings.
    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// A previous writer panicked while holding the store lock.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// A string key/value store with local-storage semantics.
///
/// Writes are visible to subsequent reads immediately. Removing a missing key
/// is not an error.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// List all keys, sorted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing medium cannot be read.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Well-known storage keys.
pub mod keys {
    use super::Email;

    /// Encoded credential.
    pub const TOKEN: &str = "token";

    /// Display name mirror.
    pub const USER_NAME: &str = "userName";

    /// Surname mirror.
    pub const USER_SURNAME: &str = "userSurname";

    /// National ID (DNI) mirror.
    pub const USER_DNI: &str = "userDni";

    /// Avatar reference mirror.
    pub const USER_PROFILE_PHOTO: &str = "userProfilePhoto";

    /// Email mirror.
    pub const USER_EMAIL: &str = "userEmail";

    /// Every key cleared on logout or when the stored credential is rejected.
    pub const IDENTITY_KEYS: [&str; 6] = [
        TOKEN,
        USER_NAME,
        USER_SURNAME,
        USER_DNI,
        USER_PROFILE_PHOTO,
        USER_EMAIL,
    ];

    /// Cart key used while browsing anonymously.
    pub const GUEST_CART: &str = "cart_guest";

    /// Mock account directory.
    pub const ACCOUNTS: &str = "ecommerce_users";

    /// Cart key for an identity, or the guest key when anonymous.
    #[must_use]
    pub fn cart(email: Option<&Email>) -> String {
        email.map_or_else(|| GUEST_CART.to_owned(), |email| format!("cart_{email}"))
    }

    /// Order history key for an identity.
    #[must_use]
    pub fn orders(email: &Email) -> String {
        format!("orders_{email}")
    }
}
