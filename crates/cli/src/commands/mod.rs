//! Subcommand implementations.
//!
//! Results are reported through `tracing` so they share formatting (and the
//! JSON mode) with the library's own logs.

pub mod account;
pub mod cart;
pub mod orders;
