//! Manifest text format.
//!
//! A manifest is a newline-delimited log of `path = digest` lines. It is read
//! as an ordered sequence, never as a keyed map: a path may legitimately
//! appear more than once, and lookups choose the first or last occurrence
//! explicitly.
//!
//! Paths of files that live under the manifest's own directory are recorded
//! relative to it with `/` separators; anything else is recorded absolute.
//! Relative paths are resolved against the manifest's directory when read back.

/// Exclusion rules applied when generating a manifest.
pub mod exclude;
/// Bounded line reader.
pub mod reader;
/// Atomic manifest writer.
pub mod writer;

pub use exclude::ExclusionRules;
pub use reader::{MAX_LINE_LEN, ManifestLine, ManifestReader};
pub use writer::{ManifestWriter, WriteSummary};

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Separator between path and digest on a manifest line.
pub const SEPARATOR: &str = " = ";

/// Conventional manifest file name.
pub const DEFAULT_MANIFEST_NAME: &str = "SHA256";

/// One `path = digest` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRecord {
    /// Recorded path, `/`-separated
    pub path: String,
    /// Recorded hex digest, as stored
    pub digest: String,
}

impl fmt::Display for ManifestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.path, self.digest)
    }
}

/// Parse one manifest line.
///
/// The line terminator is dropped, then the text is split on the first
/// `" = "`. Returns `None` if there is no separator or either side is empty.
#[must_use]
pub fn parse_line(line: &str) -> Option<ManifestRecord> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);

    let (path, digest) = line.split_once(SEPARATOR)?;
    let digest = digest.trim();
    if path.is_empty() || digest.is_empty() {
        return None;
    }

    Some(ManifestRecord {
        path: path.to_string(),
        digest: digest.to_string(),
    })
}

/// Lexically normalize a recorded path for comparison.
///
/// Backslashes become `/`, empty and `.` segments are dropped. A leading `/`
/// is kept. `..` is left alone since resolving it lexically can change meaning
/// across symlinks.
#[must_use]
pub fn normalize_record_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');

    let joined = unified
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/");

    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Render a filesystem path with `/` separators.
pub(crate) fn slash_path(path: &Path) -> String {
    let rendered = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        rendered.into_owned()
    } else {
        rendered.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

/// The path string to record for `file` in a manifest living in `base`.
#[must_use]
pub fn record_path(file: &Path, base: &Path) -> String {
    match file.strip_prefix(base) {
        Ok(relative) => relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => slash_path(file),
    }
}

/// Resolve a recorded path against the manifest's directory.
#[must_use]
pub fn resolve_record_path(recorded: &str, base: &Path) -> PathBuf {
    let path = Path::new(recorded);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Directory a manifest's relative paths are resolved against.
///
/// This is the manifest's parent directory, or `.` for a bare file name.
#[must_use]
pub fn manifest_dir(manifest: &Path) -> PathBuf {
    match manifest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
