#![warn(missing_docs)]
#![allow(clippy::arithmetic_side_effects)] // Counters bounded by file counts
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # Bulkhasher - Parallel SHA-256 Manifests
//!
//! Bulkhasher computes SHA-256 digests for every regular file under a
//! directory tree and uses them to generate and verify integrity manifests:
//! plain text files of `path = digest` lines.
//!
//! ## Features
//!
//! - **Parallel Hashing**: a per-call Rayon pool drains files one index at a time
//! - **Stack-Based Walk**: iterative traversal, depth bounded only by memory
//! - **Atomic Manifests**: output is published by rename, never half-written
//! - **Three-Way Verification**: verified, mismatched and unverifiable entries
//!   are tallied separately
//! - **Exact Lookup**: digests are found by normalized path equality
//! - **Cancellation**: a shared token is checked before every buffer read
//!
//! ## Architecture
//!
//! - [`scanner`]: directory traversal
//! - [`hasher`]: bulk parallel hashing
//! - [`manifest`]: text format, exclusion rules, reader and atomic writer
//! - [`verify`]: recompute-and-compare
//! - [`lookup`]: single-entry digest lookup
//! - [`ops`]: the four boundary operations
//! - [`config`]: TOML configuration
//! - [`output`]: terminal styling for the `bulkhash` binary
//!
//! ## Example Usage
//!
//! ```no_run
//! use bulkhasher::{check_manifest, lookup_hash, regenerate_manifest};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let report = regenerate_manifest(Path::new("assets"), Path::new("assets/SHA256"))?;
//! println!("{} files recorded", report.summary.written);
//!
//! let check = check_manifest(Path::new("assets/SHA256"))?;
//! assert_eq!(check.mismatch_count(), 0);
//!
//! let digest = lookup_hash("sub/b.txt", Path::new("assets/SHA256"))?;
//! # Ok(())
//! # }
//! ```

/// Cooperative cancellation of bulk runs.
pub mod cancel;

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Command implementations for the `bulkhash` binary.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Per-invocation diagnostic sink.
pub mod diagnostics;

/// Typed library errors.
pub mod error;

/// Bulk parallel hashing.
pub mod hasher;

/// Single-entry digest lookup.
pub mod lookup;

/// Manifest format, reader and writer.
pub mod manifest;

/// Boundary operations with default or explicit configuration.
pub mod ops;

/// Output formatting and styling.
pub mod output;

/// Filesystem scanning.
pub mod scanner;

/// Utility functions and helpers.
pub mod utils;

/// Manifest verification.
pub mod verify;

pub use cancel::CancellationToken;
pub use config::Config;
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use error::{HashError, Result};
pub use hasher::{DigestOutcome, HashOptions};
pub use lookup::MatchPolicy;
pub use manifest::{ExclusionRules, ManifestRecord, WriteSummary};
pub use ops::{
    GenerateReport, check_manifest, check_manifest_with, compute_hash, compute_hash_with,
    lookup_hash, lookup_hash_with, regenerate_manifest, regenerate_manifest_with,
};
pub use verify::{VerifyOptions, VerifyReport};

use std::path::{Path, PathBuf};

/// Current version of bulkhasher from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration plus an optional cancellation token, shared by every operation.
#[derive(Debug, Clone, Default)]
pub struct BulkHasher {
    /// Loaded configuration settings.
    pub config: Config,

    /// Token checked by every hashing worker.
    pub cancel: Option<CancellationToken>,
}

impl BulkHasher {
    /// Creates a context around an explicit configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Creates a context from the configuration file at `path`, or the default
    /// location when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is invalid.
    pub fn from_config_file(path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Config::default_path(),
        };
        let config = match config_path {
            Some(path) => Config::load(&path)?,
            None => Config::default(),
        };
        Ok(Self::new(config))
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Hashing options from the configuration, carrying the token.
    #[must_use]
    pub fn hash_options(&self) -> HashOptions {
        HashOptions {
            cancel: self.cancel.clone(),
            ..self.config.hash_options()
        }
    }

    /// Default manifest path inside `dir`.
    #[must_use]
    pub fn manifest_path_in(&self, dir: &Path) -> PathBuf {
        dir.join(&self.config.manifest.file_name)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}
