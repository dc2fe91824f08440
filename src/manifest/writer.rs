use super::{ExclusionRules, ManifestRecord, manifest_dir, parse_line, record_path};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{HashError, Result};
use crate::hasher::DigestOutcome;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Counts reported after a manifest is published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Lines written
    pub written: usize,
    /// Files dropped by exclusion rules
    pub excluded: usize,
    /// Files dropped because they could not be hashed
    pub unreadable: usize,
    /// Files dropped because their line would not parse back to the same path
    pub unrecordable: usize,
}

/// Single-owner writer that publishes a manifest atomically.
///
/// Lines go to a temporary file beside the destination. Only
/// [`ManifestWriter::commit`] renames it into place; dropping the writer
/// without committing removes the temporary file and leaves any existing
/// manifest untouched.
pub struct ManifestWriter {
    /// Final destination
    output: PathBuf,
    /// Canonical directory relative paths are recorded against
    base: PathBuf,
    /// The destination as it would be enumerated, so it is never listed
    own_path: PathBuf,
    /// Buffered temporary file
    out: BufWriter<NamedTempFile>,
    /// Running counts
    summary: WriteSummary,
}

impl ManifestWriter {
    /// Prepare to write a manifest at `output`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::ManifestWrite`] if the destination directory does not
    /// exist or a temporary file cannot be created in it.
    pub fn create(output: &Path) -> Result<Self> {
        let write_err = |e| HashError::manifest_write(output, e);

        let file_name = output.file_name().ok_or_else(|| {
            write_err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "manifest path has no file name",
            ))
        })?;
        let base = std::fs::canonicalize(manifest_dir(output)).map_err(write_err)?;
        let own_path = base.join(file_name);

        let tmp = tempfile::Builder::new()
            .prefix(".bulkhash-")
            .suffix(".tmp")
            .tempfile_in(&base)
            .map_err(write_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o644))
                .map_err(write_err)?;
        }

        Ok(Self {
            output: output.to_path_buf(),
            base,
            own_path,
            out: BufWriter::new(tmp),
            summary: WriteSummary::default(),
        })
    }

    /// Directory that relative record paths are resolved against
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// Whether `path` is the destination or the temporary file being written.
    ///
    /// Both live in [`Self::base_dir`], so a walk over that directory sees them.
    #[must_use]
    pub fn is_own_file(&self, path: &Path) -> bool {
        path == self.own_path || path == self.out.get_ref().path()
    }

    /// Append one line per successfully hashed, non-excluded file found under
    /// `root`.
    ///
    /// `files` and `digests` must be index-aligned. Lines follow `files` order.
    /// A path containing the separator or a line break is skipped with an
    /// [`DiagnosticKind::Unrecordable`] diagnostic, since its line could never
    /// be verified.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Misaligned`] if the lengths differ, or
    /// [`HashError::ManifestWrite`] if writing fails.
    pub fn append(
        &mut self,
        root: &Path,
        files: &[PathBuf],
        digests: &[DigestOutcome],
        rules: &ExclusionRules,
        diagnostics: &Diagnostics,
    ) -> Result<()> {
        if files.len() != digests.len() {
            return Err(HashError::Misaligned {
                files: files.len(),
                digests: digests.len(),
            });
        }

        for (file, outcome) in files.iter().zip(digests) {
            if rules.excludes_path(file, root) || self.is_own_file(file) {
                self.summary.excluded += 1;
                continue;
            }
            let Some(digest) = outcome.digest() else {
                self.summary.unreadable += 1;
                continue;
            };

            let record = ManifestRecord {
                path: record_path(file, &self.base),
                digest: digest.to_string(),
            };
            if !round_trips(&record) {
                diagnostics.emit(
                    DiagnosticKind::Unrecordable,
                    file,
                    "name contains \" = \" or a line break",
                );
                self.summary.unrecordable += 1;
                continue;
            }
            writeln!(self.out, "{record}")
                .map_err(|e| HashError::manifest_write(&self.output, e))?;
            self.summary.written += 1;
        }

        Ok(())
    }

    /// Count files that were excluded before reaching the writer
    pub fn note_excluded(&mut self, count: usize) {
        self.summary.excluded += count;
    }

    /// Flush, sync and move the manifest into place.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::ManifestWrite`] if flushing or renaming fails. The
    /// temporary file is removed in that case.
    pub fn commit(self) -> Result<WriteSummary> {
        let output = self.output;
        let write_err = |e| HashError::manifest_write(&output, e);

        let tmp = self.out.into_inner().map_err(|e| write_err(e.into_error()))?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&output).map_err(|e| write_err(e.error))?;

        debug!(
            output = %output.display(),
            written = self.summary.written,
            excluded = self.summary.excluded,
            unreadable = self.summary.unreadable,
            unrecordable = self.summary.unrecordable,
            "Manifest published"
        );
        Ok(self.summary)
    }
}

/// Whether `record` reads back as the same path
fn round_trips(record: &ManifestRecord) -> bool {
    !record.path.contains(['\n', '\r'])
        && parse_line(&record.to_string()).is_some_and(|parsed| parsed.path == record.path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::TempDir;

    const D1: &str = "2d711642b726b04401627ca9fbac32f5c8530fb1903cc4db02258717921a4881";
    const D2: &str = "a1fce4363854ff888cff4b8e7875d600c2682390412a8cf79b37d0b11148b0fa";

    fn leftover_temp_files(dir: &Path) -> Result<usize> {
        Ok(fs::read_dir(dir)?
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(".bulkhash-"))
            .count())
    }

    #[test]
    fn test_writes_lines_in_order() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = fs::canonicalize(temp_dir.path())?;
        let output = root.join("SHA256");

        let files = vec![root.join("b.txt"), root.join("sub/a.txt")];
        let digests = vec![
            DigestOutcome::Digest(D1.to_string()),
            DigestOutcome::Digest(D2.to_string()),
        ];

        let mut writer = ManifestWriter::create(&output)?;
        writer.append(&root, &files, &digests, &ExclusionRules::default(), &Diagnostics::new())?;
        let summary = writer.commit()?;

        assert_eq!(summary.written, 2);
        assert_eq!(
            fs::read_to_string(&output)?,
            format!("b.txt = {D1}\nsub/a.txt = {D2}\n")
        );
        assert_eq!(leftover_temp_files(&root)?, 0);

        Ok(())
    }

    #[test]
    fn test_skips_excluded_unreadable_and_self() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = fs::canonicalize(temp_dir.path())?;
        let output = root.join("SHA256");

        let files = vec![
            root.join(".git"),
            root.join("weights/model.pt"),
            root.join("broken.bin"),
            root.join("SHA256"),
            root.join("kept.txt"),
        ];
        let digests = vec![
            DigestOutcome::Digest(D1.to_string()),
            DigestOutcome::Digest(D1.to_string()),
            DigestOutcome::Unreadable,
            DigestOutcome::Digest(D1.to_string()),
            DigestOutcome::Digest(D2.to_string()),
        ];

        let mut writer = ManifestWriter::create(&output)?;
        writer.append(&root, &files, &digests, &ExclusionRules::default(), &Diagnostics::new())?;
        let summary = writer.commit()?;

        assert_eq!(
            summary,
            WriteSummary {
                written: 1,
                excluded: 3,
                unreadable: 1,
                unrecordable: 0,
            }
        );
        assert_eq!(fs::read_to_string(&output)?, format!("kept.txt = {D2}\n"));

        Ok(())
    }

    #[test]
    fn test_own_files_are_recognised() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = fs::canonicalize(temp_dir.path())?;
        let writer = ManifestWriter::create(&root.join("SHA256"))?;

        assert!(writer.is_own_file(&root.join("SHA256")));
        let temp_files: Vec<PathBuf> = fs::read_dir(&root)?
            .filter_map(std::result::Result::ok)
            .map(|e| e.path())
            .collect();
        assert_eq!(temp_files.len(), 1);
        assert!(writer.is_own_file(&temp_files[0]));
        assert!(!writer.is_own_file(&root.join("other.txt")));

        Ok(())
    }

    #[test]
    fn test_misaligned_input_is_rejected() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let output = temp_dir.path().join("SHA256");

        let mut writer = ManifestWriter::create(&output)?;
        let err = writer
            .append(
                temp_dir.path(),
                &[PathBuf::from("a")],
                &[],
                &ExclusionRules::none(),
                &Diagnostics::new(),
            )
            .unwrap_err();
        assert!(matches!(err, HashError::Misaligned { files: 1, digests: 0 }));

        Ok(())
    }

    #[test]
    fn test_missing_output_directory_is_fatal() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let output = temp_dir.path().join("missing/dir/SHA256");

        let result = ManifestWriter::create(&output);
        assert!(matches!(result, Err(HashError::ManifestWrite { .. })));
        assert!(!output.exists());

        Ok(())
    }

    #[test]
    fn test_dropped_writer_leaves_nothing_behind() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let output = temp_dir.path().join("SHA256");
        fs::write(&output, "previous contents\n")?;

        {
            let mut writer = ManifestWriter::create(&output)?;
            writer.append(
                temp_dir.path(),
                &[temp_dir.path().join("a.txt")],
                &[DigestOutcome::Digest(D1.to_string())],
                &ExclusionRules::none(),
                &Diagnostics::new(),
            )?;
        }

        assert_eq!(fs::read_to_string(&output)?, "previous contents\n");
        assert_eq!(leftover_temp_files(temp_dir.path())?, 0);

        Ok(())
    }

    #[test]
    fn test_unparseable_names_are_skipped() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = fs::canonicalize(temp_dir.path())?;
        let output = root.join("SHA256");

        let files = vec![
            root.join("a = b.txt"),
            root.join("line\nbreak.txt"),
            root.join("trailing =.txt"),
            root.join("ok.txt"),
        ];
        let digests = vec![DigestOutcome::Digest(D1.to_string()); 4];

        let diagnostics = Diagnostics::new();
        let mut writer = ManifestWriter::create(&output)?;
        writer.append(&root, &files, &digests, &ExclusionRules::none(), &diagnostics)?;
        let summary = writer.commit()?;

        assert_eq!(summary.written, 2);
        assert_eq!(summary.unrecordable, 2);
        assert_eq!(
            fs::read_to_string(&output)?,
            format!("trailing =.txt = {D1}\nok.txt = {D1}\n")
        );

        let records = diagnostics.into_records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|d| d.kind == DiagnosticKind::Unrecordable));
        assert_eq!(records[0].path, root.join("a = b.txt"));

        Ok(())
    }
}
