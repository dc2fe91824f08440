//! Utility functions and helpers.
//!
//! # Submodules
//!
//! - [`hash`]: SHA-256 streaming and digest comparison
//! - [`thread_pool`]: Worker pool sizing and construction

/// SHA-256 hashing of readers, files and byte slices
pub mod hash;
/// Thread pool configuration
pub mod thread_pool;
