use super::CommandStatus;
use crate::BulkHasher;
use crate::manifest::{ManifestRecord, slash_path};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Execute hash command to print file digests
///
/// A single file prints the bare digest. Several files print manifest lines,
/// so the output can be saved and checked later.
///
/// # Errors
///
/// Returns an error for the first file that cannot be opened or read.
pub fn execute(hasher: &BulkHasher, files: &[PathBuf]) -> Result<CommandStatus> {
    if let [file] = files {
        let digest = hasher
            .compute_hash(file)
            .with_context(|| format!("Failed to hash {}", file.display()))?;
        println!("{digest}");
        return Ok(CommandStatus::Clean);
    }

    for file in files {
        let digest = hasher
            .compute_hash(file)
            .with_context(|| format!("Failed to hash {}", file.display()))?;
        let record = ManifestRecord {
            path: slash_path(file),
            digest,
        };
        println!("{record}");
    }

    Ok(CommandStatus::Clean)
}
