//! # Crewbase Shared Library
//!
//! This crate contains the types, auth primitives, and business rules shared
//! between the Crewbase API server and its tests.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Password hashing, session tokens, request authentication
//! - `policy`: Role-based authorization decisions for user records
//! - `lifecycle`: Soft/hard delete rules and validation for task records
//! - `db`: Connection pool and migration helpers

pub mod auth;
pub mod db;
pub mod lifecycle;
pub mod models;
pub mod policy;

/// Current version of the Crewbase shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
