//! Domain models for the storefront.
//!
//! These are the shapes persisted in the key/value store. Field names are
//! serialized in camel case to stay readable by the existing web client.

pub mod account;
pub mod cart;
pub mod identity;
pub mod order;

pub use account::Account;
pub use cart::{DEFAULT_STOCK_CEILING, LineItem, Product};
pub use identity::Identity;
pub use order::{CustomerInfo, Order};
