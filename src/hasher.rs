//! Parallel content hashing over a file list.
//!
//! Workers claim one index at a time from a shared indexed iterator, so a few
//! very large files do not hold back a worker that was statically handed a
//! long run of them. Each worker thread keeps one read buffer for the whole
//! batch and takes a fresh digest context per file; the only shared mutable
//! state is the diagnostics sink.

use crate::cancel::CancellationToken;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{HashError, Result};
use crate::utils::hash::{DEFAULT_BUFFER_SIZE, hash_file_with};
use crate::utils::thread_pool::{build_pool, default_workers};
use rayon::prelude::*;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, span};

thread_local! {
    /// Read buffer reused by every file a worker hashes
    static READ_BUFFER: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };
}

/// Result of hashing one file, index-aligned with the input list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestOutcome {
    /// Lowercase hex digest of the full content
    Digest(String),
    /// The file could not be opened or was not read to the end
    Unreadable,
    /// The run was cancelled before this file was finished
    Cancelled,
}

impl DigestOutcome {
    /// The digest, if hashing succeeded
    #[must_use]
    pub fn digest(&self) -> Option<&str> {
        match self {
            Self::Digest(digest) => Some(digest),
            Self::Unreadable | Self::Cancelled => None,
        }
    }
}

/// Tuning for a bulk hashing run.
#[derive(Debug, Clone)]
pub struct HashOptions {
    /// Number of workers in the pool
    pub threads: usize,
    /// Size of each worker's read buffer in bytes
    pub buffer_size: usize,
    /// Checked before every buffer read
    pub cancel: Option<CancellationToken>,
}

impl Default for HashOptions {
    fn default() -> Self {
        Self {
            threads: default_workers(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            cancel: None,
        }
    }
}

/// Hash every file in `files` on a pool built for this call.
///
/// Per-file failures never abort the batch: they become
/// [`DigestOutcome::Unreadable`] and one diagnostic each.
///
/// # Errors
///
/// Returns an error only if the worker pool cannot be started.
pub fn hash_files(
    files: &[PathBuf],
    options: &HashOptions,
    diagnostics: &Diagnostics,
) -> Result<Vec<DigestOutcome>> {
    let pool = build_pool(options.threads)?;
    Ok(hash_files_in(&pool, files, options, diagnostics))
}

/// Hash every file in `files` on an existing pool.
///
/// The returned vector has exactly one slot per input path, in input order.
pub fn hash_files_in(
    pool: &rayon::ThreadPool,
    files: &[PathBuf],
    options: &HashOptions,
    diagnostics: &Diagnostics,
) -> Vec<DigestOutcome> {
    hash_batch(pool, files, options, diagnostics, DiagnosticKind::Unreadable)
}

/// Shared batch loop; `failure_kind` is the diagnostic recorded for files that
/// cannot be hashed.
pub(crate) fn hash_batch(
    pool: &rayon::ThreadPool,
    files: &[PathBuf],
    options: &HashOptions,
    diagnostics: &Diagnostics,
    failure_kind: DiagnosticKind,
) -> Vec<DigestOutcome> {
    let span = span!(
        Level::DEBUG,
        "hash_files",
        files = files.len(),
        workers = pool.current_num_threads()
    );
    let _guard = span.enter();

    let buffer_size = options.buffer_size.max(1);
    let cancel = options.cancel.as_ref();

    let outcomes: Vec<DigestOutcome> = pool.install(|| {
        files
            .par_iter()
            .with_max_len(1)
            .map(|path| {
                READ_BUFFER.with_borrow_mut(|buffer| {
                    buffer.resize(buffer_size, 0);
                    hash_one(path, buffer, cancel, diagnostics, failure_kind)
                })
            })
            .collect()
    });

    debug!(
        hashed = outcomes.iter().filter(|o| o.digest().is_some()).count(),
        "Bulk hashing complete"
    );
    outcomes
}

fn hash_one(
    path: &Path,
    buffer: &mut [u8],
    cancel: Option<&CancellationToken>,
    diagnostics: &Diagnostics,
    failure_kind: DiagnosticKind,
) -> DigestOutcome {
    match hash_file_with(path, buffer, cancel) {
        Ok(digest) => DigestOutcome::Digest(digest),
        Err(HashError::Cancelled) => {
            diagnostics.emit(DiagnosticKind::Cancelled, path, "");
            DigestOutcome::Cancelled
        }
        Err(e) => {
            let detail = match &e {
                HashError::Open { source, .. } | HashError::Read { source, .. } => {
                    format!("{}: {source}", e.kind())
                }
                _ => e.to_string(),
            };
            diagnostics.emit(failure_kind, path, detail);
            DigestOutcome::Unreadable
        }
    }
}
