//! Shopfront Core - Shared types library.
//!
//! This crate provides common types used across all Shopfront components:
//! - `storefront` - Session and cart state over a key/value store
//! - `cli` - Command-line driver for a file-backed store
//!
//! # Architecture
//!
//! The core crate contains only types and pure encodings - no I/O, no storage
//! access, no clocks. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, roles, statuses and
//!   the pseudo-authentication credential

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
