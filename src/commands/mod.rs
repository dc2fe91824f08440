//! Command implementations for the `bulkhash` binary.
//!
//! Each command returns a [`CommandStatus`] that `main` maps to an exit code;
//! hard failures come back as `Err` and exit with [`EXIT_ERROR`].

pub mod check;
pub mod config;
pub mod generate;
pub mod hash;
pub mod lookup;

use crate::BulkHasher;
use crate::output;
use std::path::{Path, PathBuf};

/// Exit code for a command that could not run.
pub const EXIT_ERROR: i32 = 2;

/// How a command that ran to completion turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// Everything checked out
    Clean,
    /// Mismatches found, or a lookup missed
    Failed,
}

impl CommandStatus {
    /// Process exit code
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Clean => 0,
            Self::Failed => 1,
        }
    }
}

/// `manifest`, or the configured file name in the current directory.
fn manifest_or_default(hasher: &BulkHasher, manifest: Option<&Path>) -> PathBuf {
    manifest.map_or_else(|| hasher.manifest_path_in(Path::new(".")), Path::to_path_buf)
}

/// Print every diagnostic an operation collected.
fn report_diagnostics(diagnostics: &[crate::Diagnostic]) {
    for diagnostic in diagnostics {
        output::diagnostic(diagnostic);
    }
}
