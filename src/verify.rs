//! Manifest verification.
//!
//! Every record is re-hashed with the same algorithm and worker pool used for
//! generation, then compared with the stored digest ignoring case. Each entry
//! lands in exactly one of three tallies:
//!
//! - **verified**: digests agree
//! - **mismatch**: the file was read and its digest differs
//! - **unverifiable**: the file could not be opened or read
//!
//! Only mismatches count toward [`VerifyReport::mismatch_count`]. Lines that do
//! not parse are skipped and never counted as either.

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::{HashError, Result};
use crate::hasher::{DigestOutcome, HashOptions, hash_batch};
use crate::manifest::{
    ManifestLine, ManifestReader, ManifestRecord, manifest_dir, resolve_record_path,
};
use crate::utils::hash::{digests_match, is_hex_digest};
use crate::utils::thread_pool::build_pool;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, span};

/// Options for a verification run.
#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    /// Worker pool and buffer tuning
    pub hash: HashOptions,
    /// Directory relative record paths resolve against; defaults to the
    /// manifest's own directory
    pub base_dir: Option<PathBuf>,
}

/// Outcome of checking a manifest.
#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    /// Entries whose digest matched
    pub verified: usize,
    /// Recorded paths whose digest differed, in manifest order
    pub mismatches: Vec<String>,
    /// Recorded paths that could not be read, in manifest order
    pub unverifiable: Vec<String>,
    /// Non-blank lines that could not be parsed
    pub malformed: usize,
    /// Every diagnostic emitted during the run
    pub diagnostics: Vec<Diagnostic>,
}

impl VerifyReport {
    /// Number of entries whose digest differed. This is the authoritative result.
    #[must_use]
    pub fn mismatch_count(&self) -> usize {
        self.mismatches.len()
    }

    /// Number of entries that could not be checked
    #[must_use]
    pub fn unverifiable_count(&self) -> usize {
        self.unverifiable.len()
    }

    /// Number of records checked, whatever their outcome
    #[must_use]
    pub fn entries(&self) -> usize {
        self.verified + self.mismatches.len() + self.unverifiable.len()
    }

    /// Whether every record was read and matched
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty() && self.unverifiable.is_empty()
    }
}

/// Re-hash every file listed in `manifest` and compare with stored digests.
///
/// # Errors
///
/// - [`HashError::ManifestOpen`] if the manifest cannot be opened
/// - [`HashError::Read`] if reading the manifest fails part way through
/// - [`HashError::Cancelled`] if the run is cancelled
/// - [`HashError::Pool`] if workers cannot be started
pub fn check_manifest(manifest: &Path, options: &VerifyOptions) -> Result<VerifyReport> {
    let span = span!(Level::DEBUG, "check_manifest", manifest = %manifest.display());
    let _guard = span.enter();

    let reader = ManifestReader::open(manifest)?;
    let base = options
        .base_dir
        .clone()
        .unwrap_or_else(|| manifest_dir(manifest));
    let diagnostics = Diagnostics::new();

    let mut records: Vec<ManifestRecord> = Vec::new();
    let mut malformed = 0;
    for item in reader {
        let (line_no, line) = item?;
        match line {
            ManifestLine::Record(record) => records.push(record),
            ManifestLine::Blank => {}
            ManifestLine::Malformed(reason) => {
                malformed += 1;
                diagnostics.emit(
                    DiagnosticKind::MalformedLine,
                    manifest,
                    format!("line {line_no}: {reason}"),
                );
            }
        }
    }
    debug!(records = records.len(), malformed, "Manifest parsed");

    let paths: Vec<PathBuf> = records
        .iter()
        .map(|r| resolve_record_path(&r.path, &base))
        .collect();

    let pool = build_pool(options.hash.threads)?;
    let outcomes = hash_batch(
        &pool,
        &paths,
        &options.hash,
        &diagnostics,
        DiagnosticKind::Unverifiable,
    );

    let mut report = VerifyReport {
        malformed,
        ..VerifyReport::default()
    };

    for ((record, path), outcome) in records.into_iter().zip(&paths).zip(outcomes) {
        match outcome {
            DigestOutcome::Digest(computed) if digests_match(&record.digest, &computed) => {
                report.verified += 1;
            }
            DigestOutcome::Digest(computed) => {
                let detail = if is_hex_digest(&record.digest) {
                    format!("expected {}, found {computed}", record.digest)
                } else {
                    format!("stored digest {:?} is not a SHA-256 hex digest", record.digest)
                };
                diagnostics.emit(DiagnosticKind::Mismatch, path, detail);
                report.mismatches.push(record.path);
            }
            DigestOutcome::Unreadable => report.unverifiable.push(record.path),
            DigestOutcome::Cancelled => return Err(HashError::Cancelled),
        }
    }

    debug!(
        verified = report.verified,
        mismatches = report.mismatch_count(),
        unverifiable = report.unverifiable_count(),
        "Verification complete"
    );
    report.diagnostics = diagnostics.into_records();
    Ok(report)
}
