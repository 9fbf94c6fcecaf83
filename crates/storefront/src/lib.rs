//! Shopfront Storefront library.
//!
//! Client-side session and cart state for the storefront, kept in a
//! per-browser key/value store with no real backend.
//!
//! # Architecture
//!
//! - [`session::SessionManager`] decides who is logged in from a stored,
//!   unsigned credential.
//! - [`cart::CartManager`] keeps the cart under a key derived from that
//!   identity (`cart_<email>` or `cart_guest`) and swaps it on every identity
//!   change, without merging.
//! - [`state::Storefront`] owns both, wires login/logout to cart reloads and
//!   runs checkout into the order history.
//! - Storage and time are injected ([`storage::KeyValueStore`],
//!   [`clock::Clock`]) so tests run against in-memory fakes.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;
pub mod telemetry;

pub use state::Storefront;
