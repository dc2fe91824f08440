//! Per-invocation diagnostic sink.
//!
//! Every skipped, unreadable, mismatched or malformed item produces exactly one
//! [`Diagnostic`]. Workers share the sink by reference; the single mutex around
//! the record list is the only lock taken while hashing.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A directory could not be opened during traversal
    DirectoryUnreadable,
    /// A file could not be opened or read while hashing
    Unreadable,
    /// A recomputed digest differs from the stored one
    Mismatch,
    /// A manifest entry could not be checked because its file is unreadable
    Unverifiable,
    /// A manifest line could not be parsed
    MalformedLine,
    /// A file name cannot be written as a manifest line that parses back
    Unrecordable,
    /// Work was abandoned because the operation was cancelled
    Cancelled,
}

impl DiagnosticKind {
    /// Short label used when printing
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DirectoryUnreadable => "Error opening directory",
            Self::Unreadable => "Error reading file",
            Self::Mismatch => "Hash mismatch",
            Self::Unverifiable => "Unable to verify",
            Self::MalformedLine => "Malformed line",
            Self::Unrecordable => "Cannot record path",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// One reported problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Category
    pub kind: DiagnosticKind,
    /// Path the diagnostic refers to (file, directory, or manifest)
    pub path: PathBuf,
    /// Free-form detail, usually the underlying error
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.path.display())?;
        if !self.message.is_empty() {
            write!(f, " ({})", self.message)?;
        }
        Ok(())
    }
}

/// Mutex-guarded collection of diagnostics for a single operation.
#[derive(Debug, Default)]
pub struct Diagnostics {
    /// Records in emission order
    records: Mutex<Vec<Diagnostic>>,
}

impl Diagnostics {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it
    pub fn emit(&self, kind: DiagnosticKind, path: &Path, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            kind,
            path: path.to_path_buf(),
            message: message.into(),
        };
        warn!(kind = ?diagnostic.kind, path = %diagnostic.path.display(), "{}", diagnostic.message);

        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }

    /// Number of diagnostics recorded so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume the sink, returning records in emission order
    #[must_use]
    pub fn into_records(self) -> Vec<Diagnostic> {
        self.records
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
