//! Directory walker for enumerating every regular file under a root.
//!
//! Traversal is depth-first over an explicit stack of pending directories, so
//! nesting depth is bounded by memory rather than by the call stack. Symbolic
//! links, devices, sockets and FIFOs are never listed or followed.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{HashError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, span};

/// Initial capacity reserved for the file list.
pub const FILES_TO_STORE: usize = 256;

/// Traversal options
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkOptions {
    /// Sort the file list by path once traversal completes
    pub sort: bool,
}

/// Collect every regular file reachable from `root`.
///
/// Directories that cannot be opened (including `root` itself) are reported to
/// `diagnostics` and skipped; the walk carries on with whatever else is
/// reachable. Paths are `root` joined with each entry name.
///
/// # Errors
///
/// Returns [`HashError::Allocation`] if the file list or the pending-directory
/// stack cannot grow. Everything collected so far is released.
pub fn walk(root: &Path, options: WalkOptions, diagnostics: &Diagnostics) -> Result<Vec<PathBuf>> {
    let span = span!(Level::DEBUG, "walk", root = %root.display());
    let _guard = span.enter();

    let mut files: Vec<PathBuf> = Vec::new();
    files
        .try_reserve_exact(FILES_TO_STORE)
        .map_err(|_| allocation_failure(root))?;

    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                diagnostics.emit(DiagnosticKind::DirectoryUnreadable, &dir, e.to_string());
                continue;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    diagnostics.emit(DiagnosticKind::DirectoryUnreadable, &dir, e.to_string());
                    continue;
                }
            };

            // Does not follow symlinks
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    diagnostics.emit(DiagnosticKind::Unreadable, &entry.path(), e.to_string());
                    continue;
                }
            };

            if file_type.is_file() {
                grow_if_full(&mut files, root)?;
                files.push(entry.path());
            } else if file_type.is_dir() {
                pending
                    .try_reserve(1)
                    .map_err(|_| allocation_failure(root))?;
                pending.push(entry.path());
            }
        }
    }

    if options.sort {
        files.sort();
    }

    debug!(files = files.len(), "Directory walk complete");
    Ok(files)
}

/// Double the list's capacity when it is full.
///
/// On failure the list is left untouched; the caller's `?` drops it.
fn grow_if_full(files: &mut Vec<PathBuf>, root: &Path) -> Result<()> {
    if files.len() < files.capacity() {
        return Ok(());
    }

    let additional = files.capacity().max(FILES_TO_STORE);
    files
        .try_reserve_exact(additional)
        .map_err(|_| allocation_failure(root))
}

fn allocation_failure(root: &Path) -> HashError {
    HashError::Allocation {
        root: root.to_path_buf(),
    }
}
