//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_cart` - Session restore and identity-keyed cart swapping
//! - `checkout_flow` - Register, fill a cart, check out, list orders
//! - `file_store` - State surviving a process restart
//!
//! Everything runs against [`MemoryStore`] or a [`FileStore`] inside a
//! [`tempfile::TempDir`], with a [`ManualClock`], so no test depends on wall
//! time or leaves files behind.
//!
//! [`FileStore`]: shopfront_storefront::storage::FileStore

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use rust_decimal::Decimal;

use shopfront_core::{Credential, CredentialClaims, Email, Price, ProductId, UserId};
use shopfront_storefront::Storefront;
use shopfront_storefront::clock::ManualClock;
use shopfront_storefront::models::Product;
use shopfront_storefront::storage::MemoryStore;

/// 2024-06-10T06:13:20Z, a fixed "now" for every scenario.
pub const NOW: i64 = 1_718_000_000_000;

/// One day in milliseconds.
pub const DAY_MS: i64 = 86_400_000;

/// A store, a clock and a storefront opened over them.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub storefront: Storefront,
}

impl TestContext {
    /// Empty store at [`NOW`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// Open a storefront over an existing store at [`NOW`].
    #[must_use]
    pub fn with_store(store: Arc<MemoryStore>) -> Self {
        let clock = Arc::new(ManualClock::at_millis(NOW));
        let storefront = Storefront::open(store.clone(), clock.clone());
        Self {
            store,
            clock,
            storefront,
        }
    }

    /// Reopen over the same store and clock, as a page reload would.
    pub fn reload(&mut self) {
        self.storefront = Storefront::open(self.store.clone(), self.clock.clone());
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Issue a credential for `email` expiring at `exp` (epoch millis).
///
/// # Panics
///
/// Panics if `email` is not a valid address.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn credential(id: i64, email: &str, role: Option<&str>, exp: i64) -> Credential {
    Credential::issue(&CredentialClaims {
        id: UserId::new(id),
        email: Email::parse(email).unwrap(),
        role: role.map(str::to_owned),
        exp,
    })
    .unwrap()
}

/// A catalog product priced at `cents / 100`.
#[must_use]
pub fn product(id: i64, cents: i64, stock: Option<u32>) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        price: Price::new(Decimal::new(cents, 2)),
        stock,
        image_url: Some(format!("https://cdn.example.com/{id}.jpg")),
        category: None,
    }
}
