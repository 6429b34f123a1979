//! # fintrack_core
//!
//! Core domain logic for Fintrack: the credential store, password hashing,
//! and session tokens that every other capability relies on for identity.

pub mod auth;
pub mod migrate;
pub mod models;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
