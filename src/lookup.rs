//! Single-entry digest lookup.
//!
//! Matching is exact equality on normalized record paths, never substring
//! containment: looking up `a.txt` does not match `data/a.txt` or `a.txt.bak`.

use crate::error::Result;
use crate::manifest::{
    ManifestLine, ManifestReader, manifest_dir, normalize_record_path, record_path, slash_path,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{Level, debug, span};

/// Which record wins when a path appears more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// The earliest matching line
    #[default]
    First,
    /// The latest matching line, i.e. the most recent append
    Last,
}

/// Find the stored digest for `target` in `manifest`.
///
/// `target` may be written as recorded (relative to the manifest's directory)
/// or as an absolute path under that directory.
///
/// # Errors
///
/// Returns [`crate::HashError::ManifestOpen`] if the manifest cannot be opened,
/// or [`crate::HashError::Read`] if reading it fails. A miss is `Ok(None)`.
pub fn lookup_hash(target: &str, manifest: &Path, policy: MatchPolicy) -> Result<Option<String>> {
    let span = span!(Level::DEBUG, "lookup_hash", path = target, manifest = %manifest.display());
    let _guard = span.enter();

    let reader = ManifestReader::open(manifest)?;
    let wanted = target_forms(target, manifest);

    let mut found = None;
    for item in reader {
        let (line_no, line) = item?;
        let ManifestLine::Record(record) = line else {
            continue;
        };

        if wanted.contains(&normalize_record_path(&record.path)) {
            debug!(line_no, "Matched record");
            match policy {
                MatchPolicy::First => return Ok(Some(record.digest)),
                MatchPolicy::Last => found = Some(record.digest),
            }
        }
    }

    Ok(found)
}

/// Normalized spellings of `target` that identify the same manifest entry
fn target_forms(target: &str, manifest: &Path) -> Vec<String> {
    let mut forms = vec![normalize_record_path(target)];

    let Ok(base) = std::fs::canonicalize(manifest_dir(manifest)) else {
        return forms;
    };

    let target_path = Path::new(target);
    let alternate = if target_path.is_absolute() {
        target_path
            .strip_prefix(&base)
            .ok()
            .map(|_| record_path(target_path, &base))
    } else {
        Some(slash_path(&base.join(target_path)))
    };

    if let Some(alternate) = alternate {
        let alternate = normalize_record_path(&alternate);
        if !forms.contains(&alternate) {
            forms.push(alternate);
        }
    }
    forms
}
