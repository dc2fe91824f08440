//! The four boundary operations: compute-hash, regenerate-manifest,
//! check-manifest and lookup-hash.
//!
//! The free functions use [`Config::default`]; the `_with` variants take an
//! explicit configuration. Both go through [`BulkHasher`], which also carries
//! an optional cancellation token.

use crate::config::Config;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{HashError, Result};
use crate::hasher::{DigestOutcome, hash_files};
use crate::manifest::{ManifestWriter, WriteSummary};
use crate::scanner::walk;
use crate::utils::hash::hash_file_with;
use crate::verify::{VerifyOptions, VerifyReport};
use crate::{BulkHasher, lookup, verify};
use std::path::Path;
use tracing::{Level, debug, info, span};

/// Outcome of regenerating a manifest.
#[derive(Debug, Clone, Default)]
pub struct GenerateReport {
    /// Regular files found under the root, before exclusion
    pub files_found: usize,
    /// Lines written and files skipped
    pub summary: WriteSummary,
    /// Every diagnostic emitted during the run
    pub diagnostics: Vec<Diagnostic>,
}

impl BulkHasher {
    /// Digest of one file.
    ///
    /// # Errors
    ///
    /// [`HashError::Open`] or [`HashError::Read`] on I/O failure,
    /// [`HashError::Cancelled`] if the token fires mid-read.
    pub fn compute_hash(&self, path: &Path) -> Result<String> {
        let mut buffer = vec![0u8; self.config.hashing.buffer_size.max(1)];
        hash_file_with(path, &mut buffer, self.cancel.as_ref())
    }

    /// Walk `root`, hash every file and publish a manifest at `output`.
    ///
    /// The output location is prepared before anything is hashed, so an
    /// unwritable destination fails fast. Nothing is published if the run is
    /// cancelled.
    ///
    /// # Errors
    ///
    /// - [`HashError::ManifestWrite`] if the manifest cannot be created or published
    /// - [`HashError::Allocation`] if the file list cannot grow
    /// - [`HashError::Cancelled`] if the run is cancelled
    /// - [`HashError::Pool`] if workers cannot be started
    pub fn regenerate_manifest(&self, root: &Path, output: &Path) -> Result<GenerateReport> {
        let span = span!(
            Level::DEBUG,
            "regenerate_manifest",
            root = %root.display(),
            output = %output.display()
        );
        let _guard = span.enter();

        let mut writer = ManifestWriter::create(output)?;
        let diagnostics = Diagnostics::new();

        // Canonical so paths under the manifest directory record as relative
        let root = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        let mut files = walk(&root, self.config.walk_options(), &diagnostics)?;
        files.retain(|f| !writer.is_own_file(f));
        let files_found = files.len();

        let rules = &self.config.manifest.exclude;
        let (files, excluded) = rules.partition(files, &root);
        debug!(files = files.len(), excluded, "Files selected for hashing");

        if self.is_cancelled() {
            return Err(HashError::Cancelled);
        }
        let digests = hash_files(&files, &self.hash_options(), &diagnostics)?;
        if digests.contains(&DigestOutcome::Cancelled) {
            return Err(HashError::Cancelled);
        }

        writer.note_excluded(excluded);
        writer.append(&root, &files, &digests, rules, &diagnostics)?;
        let summary = writer.commit()?;

        info!(
            written = summary.written,
            excluded = summary.excluded,
            unreadable = summary.unreadable,
            "Manifest regenerated"
        );
        Ok(GenerateReport {
            files_found,
            summary,
            diagnostics: diagnostics.into_records(),
        })
    }

    /// Re-hash every file listed in `manifest`.
    ///
    /// # Errors
    ///
    /// See [`verify::check_manifest`].
    pub fn check_manifest(&self, manifest: &Path) -> Result<VerifyReport> {
        let options = VerifyOptions {
            hash: self.hash_options(),
            base_dir: None,
        };
        verify::check_manifest(manifest, &options)
    }

    /// Stored digest for `target`, chosen by the configured match policy.
    ///
    /// # Errors
    ///
    /// See [`lookup::lookup_hash`].
    pub fn lookup_hash(&self, target: &str, manifest: &Path) -> Result<Option<String>> {
        lookup::lookup_hash(target, manifest, self.config.manifest.lookup)
    }
}

/// Digest of one file with the default configuration.
///
/// # Errors
///
/// See [`BulkHasher::compute_hash`].
pub fn compute_hash(path: &Path) -> Result<String> {
    BulkHasher::default().compute_hash(path)
}

/// [`compute_hash`] with an explicit configuration.
///
/// # Errors
///
/// See [`BulkHasher::compute_hash`].
pub fn compute_hash_with(path: &Path, config: &Config) -> Result<String> {
    BulkHasher::new(config.clone()).compute_hash(path)
}

/// Regenerate a manifest with the default configuration.
///
/// # Errors
///
/// See [`BulkHasher::regenerate_manifest`].
pub fn regenerate_manifest(root: &Path, output: &Path) -> Result<GenerateReport> {
    BulkHasher::default().regenerate_manifest(root, output)
}

/// [`regenerate_manifest`] with an explicit configuration.
///
/// # Errors
///
/// See [`BulkHasher::regenerate_manifest`].
pub fn regenerate_manifest_with(
    root: &Path,
    output: &Path,
    config: &Config,
) -> Result<GenerateReport> {
    BulkHasher::new(config.clone()).regenerate_manifest(root, output)
}

/// Check a manifest with the default configuration.
///
/// # Errors
///
/// See [`verify::check_manifest`].
pub fn check_manifest(manifest: &Path) -> Result<VerifyReport> {
    BulkHasher::default().check_manifest(manifest)
}

/// [`check_manifest`] with an explicit configuration.
///
/// # Errors
///
/// See [`verify::check_manifest`].
pub fn check_manifest_with(manifest: &Path, config: &Config) -> Result<VerifyReport> {
    BulkHasher::new(config.clone()).check_manifest(manifest)
}

/// Look up a digest with the default configuration.
///
/// # Errors
///
/// See [`lookup::lookup_hash`].
pub fn lookup_hash(target: &str, manifest: &Path) -> Result<Option<String>> {
    BulkHasher::default().lookup_hash(target, manifest)
}

/// [`lookup_hash`] with an explicit configuration.
///
/// # Errors
///
/// See [`lookup::lookup_hash`].
pub fn lookup_hash_with(target: &str, manifest: &Path, config: &Config) -> Result<Option<String>> {
    BulkHasher::new(config.clone()).lookup_hash(target, manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::diagnostics::DiagnosticKind;
    use crate::lookup::MatchPolicy;
    use crate::utils::hash::hash_bytes;
    use anyhow::Result;
    use std::fs;
    use tempfile::TempDir;

    fn scenario(root: &Path) -> Result<()> {
        fs::write(root.join("a.txt"), "x")?;
        fs::create_dir(root.join("sub"))?;
        fs::write(root.join("sub/b.txt"), "y")?;
        fs::write(root.join(".git"), "anything")?;
        Ok(())
    }

    fn sorted_config() -> Config {
        let mut config = Config::default();
        config.manifest.sort_paths = true;
        config
    }

    #[test]
    fn test_scenario_manifest() -> Result<()> {
        let temp_dir = TempDir::new()?;
        scenario(temp_dir.path())?;
        let manifest = temp_dir.path().join("SHA256");

        let report = regenerate_manifest_with(temp_dir.path(), &manifest, &sorted_config())?;
        assert_eq!(report.files_found, 3);
        assert_eq!(report.summary.written, 2);
        assert_eq!(report.summary.excluded, 1);

        assert_eq!(
            fs::read_to_string(&manifest)?,
            format!(
                "a.txt = {}\nsub/b.txt = {}\n",
                hash_bytes(b"x"),
                hash_bytes(b"y")
            )
        );

        Ok(())
    }

    #[test]
    fn test_regenerate_twice_does_not_list_itself() -> Result<()> {
        let temp_dir = TempDir::new()?;
        scenario(temp_dir.path())?;
        let manifest = temp_dir.path().join("SHA256");

        regenerate_manifest(temp_dir.path(), &manifest)?;
        let report = regenerate_manifest(temp_dir.path(), &manifest)?;

        assert_eq!(report.summary.written, 2);
        assert!(!fs::read_to_string(&manifest)?.contains("SHA256 ="));

        Ok(())
    }

    #[test]
    fn test_round_trip_then_sensitivity() -> Result<()> {
        let temp_dir = TempDir::new()?;
        scenario(temp_dir.path())?;
        let manifest = temp_dir.path().join("SHA256");

        regenerate_manifest(temp_dir.path(), &manifest)?;
        assert_eq!(check_manifest(&manifest)?.mismatch_count(), 0);

        fs::write(temp_dir.path().join("sub/b.txt"), "z")?;
        let report = check_manifest(&manifest)?;
        assert_eq!(report.mismatch_count(), 1);
        assert_eq!(report.verified, 1);

        Ok(())
    }

    #[test]
    fn test_compute_hash_is_deterministic() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, "x")?;

        let first = compute_hash(&file)?;
        assert_eq!(first, compute_hash(&file)?);
        assert_eq!(first, hash_bytes(b"x"));

        let mut config = Config::default();
        config.hashing.buffer_size = 1;
        assert_eq!(compute_hash_with(&file, &config)?, first);

        Ok(())
    }

    #[test]
    fn test_compute_hash_missing_file() {
        let err = compute_hash(Path::new("/no/such/file")).unwrap_err();
        assert!(matches!(err, HashError::Open { .. }));
    }

    #[test]
    fn test_unwritable_output_fails_before_hashing() -> Result<()> {
        let temp_dir = TempDir::new()?;
        scenario(temp_dir.path())?;
        let output = temp_dir.path().join("missing/SHA256");

        let err = regenerate_manifest(temp_dir.path(), &output).unwrap_err();
        assert!(matches!(err, HashError::ManifestWrite { .. }));
        assert!(!output.exists());

        Ok(())
    }

    #[test]
    fn test_missing_root_writes_empty_manifest() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let manifest = temp_dir.path().join("SHA256");

        let report = regenerate_manifest(&temp_dir.path().join("absent"), &manifest)?;
        assert_eq!(report.summary.written, 0);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::DirectoryUnreadable);
        assert_eq!(fs::read_to_string(&manifest)?, "");

        Ok(())
    }

    #[test]
    fn test_cancelled_regenerate_publishes_nothing() -> Result<()> {
        let temp_dir = TempDir::new()?;
        scenario(temp_dir.path())?;
        let manifest = temp_dir.path().join("SHA256");

        let token = CancellationToken::new();
        token.cancel();
        let hasher = BulkHasher::default().with_cancellation(token);

        let err = hasher
            .regenerate_manifest(temp_dir.path(), &manifest)
            .unwrap_err();
        assert!(matches!(err, HashError::Cancelled));
        assert!(!manifest.exists());

        Ok(())
    }

    #[test]
    fn test_lookup_uses_configured_policy() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let manifest = temp_dir.path().join("SHA256");
        fs::write(
            &manifest,
            format!(
                "a.txt = {}\na.txt = {}\n",
                hash_bytes(b"old"),
                hash_bytes(b"new")
            ),
        )?;

        assert_eq!(lookup_hash("a.txt", &manifest)?, Some(hash_bytes(b"old")));

        let mut config = Config::default();
        config.manifest.lookup = MatchPolicy::Last;
        assert_eq!(
            lookup_hash_with("a.txt", &manifest, &config)?,
            Some(hash_bytes(b"new"))
        );
        assert_eq!(lookup_hash("b.txt", &manifest)?, None);

        Ok(())
    }

    #[test]
    fn test_custom_exclusions() -> Result<()> {
        let temp_dir = TempDir::new()?;
        scenario(temp_dir.path())?;
        fs::create_dir(temp_dir.path().join("cache"))?;
        fs::write(temp_dir.path().join("cache/blob"), "c")?;
        let manifest = temp_dir.path().join("SHA256");

        let mut config = sorted_config();
        config.manifest.exclude.substrings.push("/cache/".to_string());
        let report = regenerate_manifest_with(temp_dir.path(), &manifest, &config)?;

        assert_eq!(report.summary.written, 2);
        assert!(!fs::read_to_string(&manifest)?.contains("cache"));
        assert_eq!(check_manifest_with(&manifest, &config)?.verified, 2);

        Ok(())
    }

    #[test]
    fn test_root_below_excluded_directory_is_hashed() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().join("weights/v1");
        fs::create_dir_all(&root)?;
        scenario(&root)?;
        let manifest = root.join("SHA256");

        let report = regenerate_manifest_with(&root, &manifest, &sorted_config())?;
        assert_eq!(report.summary.written, 2);
        assert_eq!(report.summary.excluded, 1);
        assert_eq!(
            fs::read_to_string(&manifest)?,
            format!(
                "a.txt = {}\nsub/b.txt = {}\n",
                hash_bytes(b"x"),
                hash_bytes(b"y")
            )
        );
        assert_eq!(check_manifest(&manifest)?.verified, 2);

        Ok(())
    }

    #[test]
    fn test_separator_in_file_name_is_not_recorded() -> Result<()> {
        let temp_dir = TempDir::new()?;
        scenario(temp_dir.path())?;
        fs::write(temp_dir.path().join("a = b.txt"), "z")?;
        let manifest = temp_dir.path().join("SHA256");

        let report = regenerate_manifest_with(temp_dir.path(), &manifest, &sorted_config())?;
        assert_eq!(report.summary.written, 2);
        assert_eq!(report.summary.unrecordable, 1);
        assert!(
            report
                .diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::Unrecordable)
        );

        let check = check_manifest(&manifest)?;
        assert_eq!(check.verified, 2);
        assert!(check.unverifiable.is_empty());

        Ok(())
    }
}
