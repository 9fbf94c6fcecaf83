//! Services backing the storefront context.
//!
//! # Services
//!
//! - `accounts` - Mock account directory (registration, login, token checks)
//! - `orders` - Checkout validation and per-identity order history

pub mod accounts;
pub mod orders;
