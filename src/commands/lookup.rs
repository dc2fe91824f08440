use super::{CommandStatus, manifest_or_default};
use crate::BulkHasher;
use crate::lookup::{MatchPolicy, lookup_hash};
use crate::output;
use anyhow::{Context, Result};
use std::path::Path;

/// Execute lookup command to print the recorded digest for `target`
///
/// `last` overrides the configured match policy. A miss is reported as
/// [`CommandStatus::Failed`], not as an error.
///
/// # Errors
///
/// Returns an error if the manifest cannot be opened or read.
pub fn execute(
    hasher: &BulkHasher,
    target: &str,
    manifest: Option<&Path>,
    last: bool,
) -> Result<CommandStatus> {
    let manifest = manifest_or_default(hasher, manifest);
    let policy = if last {
        MatchPolicy::Last
    } else {
        hasher.config.manifest.lookup
    };

    let found = lookup_hash(target, &manifest, policy)
        .with_context(|| format!("Failed to read manifest {}", manifest.display()))?;

    match found {
        Some(digest) => {
            println!("{digest}");
            Ok(CommandStatus::Clean)
        }
        None => {
            output::warning(&format!(
                "No entry for '{target}' in {}",
                manifest.display()
            ));
            Ok(CommandStatus::Failed)
        }
    }
}
