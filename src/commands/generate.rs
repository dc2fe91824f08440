use super::{CommandStatus, report_diagnostics};
use crate::BulkHasher;
use crate::output;
use anyhow::{Context, Result};
use std::path::Path;

/// Execute generate command to write a manifest for `root`
///
/// Unreadable files are left out of the manifest and reported, but do not
/// fail the command.
///
/// # Errors
///
/// Returns an error if:
/// - The manifest cannot be created or published
/// - Workers cannot be started or the file list cannot grow
pub fn execute(hasher: &BulkHasher, root: &Path, manifest: Option<&Path>) -> Result<CommandStatus> {
    let manifest = manifest.map_or_else(|| hasher.manifest_path_in(root), Path::to_path_buf);
    output::verbose(&format!(
        "Hashing files under {} with {} threads",
        root.display(),
        hasher.config.hashing.parallel_threads
    ));

    let report = hasher
        .regenerate_manifest(root, &manifest)
        .with_context(|| format!("Failed to generate manifest {}", manifest.display()))?;
    report_diagnostics(&report.diagnostics);

    let summary = report.summary;
    output::success(&format!(
        "Wrote {} entries to {}",
        summary.written,
        manifest.display()
    ));
    if summary.excluded > 0 {
        output::info(&format!("Excluded {} files", summary.excluded));
    }
    if summary.unrecordable > 0 {
        output::warning(&format!(
            "Skipped {} files whose names cannot be recorded",
            summary.unrecordable
        ));
    }
    if summary.unreadable > 0 {
        output::warning(&format!(
            "Skipped {} unreadable files (use --verbose to list them)",
            summary.unreadable
        ));
    }

    Ok(CommandStatus::Clean)
}
