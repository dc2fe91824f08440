use super::{ManifestRecord, parse_line};
use crate::error::{HashError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// Longest manifest line accepted, in bytes, excluding the line terminator.
pub const MAX_LINE_LEN: usize = 4096;

/// One classified manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLine {
    /// A well-formed `path = digest` entry
    Record(ManifestRecord),
    /// Empty or whitespace-only line
    Blank,
    /// Anything else, with the reason it was rejected
    Malformed(String),
}

/// Line-by-line manifest reader with a bounded line length.
///
/// Yields `(line_number, line)` pairs, numbering from 1. Lines longer than the
/// limit are consumed to their end and reported as malformed instead of being
/// split into fragments.
pub struct ManifestReader<R> {
    /// Buffered source
    inner: R,
    /// Path used in error messages
    path: PathBuf,
    /// Maximum accepted line length
    max_len: usize,
    /// Scratch buffer reused across lines
    buf: Vec<u8>,
    /// Number of the last line returned
    line_no: usize,
    /// Set after an I/O error so iteration stops
    failed: bool,
}

impl ManifestReader<BufReader<File>> {
    /// Open a manifest file for reading.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::ManifestOpen`] if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| HashError::manifest_open(path, e))?;
        Ok(Self::new(BufReader::new(file), path))
    }
}

impl<R: BufRead> ManifestReader<R> {
    /// Wrap an already-open source; `path` is only used for error messages
    pub fn new(inner: R, path: &Path) -> Self {
        Self {
            inner,
            path: path.to_path_buf(),
            max_len: MAX_LINE_LEN,
            buf: Vec::new(),
            line_no: 0,
            failed: false,
        }
    }

    /// Override the maximum line length
    #[must_use]
    pub const fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    fn read_line(&mut self) -> std::io::Result<Option<ManifestLine>> {
        self.buf.clear();

        // Room for the longest accepted line plus "\r\n"
        let limit = self.max_len as u64 + 2;
        let n = (&mut self.inner).take(limit).read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(None);
        }

        let terminated = self.buf.last() == Some(&b'\n');
        if !terminated && n as u64 == limit {
            self.inner.skip_until(b'\n')?;
            return Ok(Some(ManifestLine::Malformed(format!(
                "line exceeds {} bytes",
                self.max_len
            ))));
        }

        let Ok(text) = std::str::from_utf8(&self.buf) else {
            return Ok(Some(ManifestLine::Malformed("invalid UTF-8".to_string())));
        };

        let content = text.trim_end_matches(['\n', '\r']);
        if content.len() > self.max_len {
            return Ok(Some(ManifestLine::Malformed(format!(
                "line exceeds {} bytes",
                self.max_len
            ))));
        }
        if content.trim().is_empty() {
            return Ok(Some(ManifestLine::Blank));
        }

        Ok(Some(match parse_line(content) {
            Some(record) => ManifestLine::Record(record),
            None => ManifestLine::Malformed("missing \" = \" separator".to_string()),
        }))
    }
}

impl<R: BufRead> Iterator for ManifestReader<R> {
    type Item = Result<(usize, ManifestLine)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.read_line() {
            Ok(Some(line)) => {
                self.line_no += 1;
                Some(Ok((self.line_no, line)))
            }
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(HashError::read(&self.path, e)))
            }
        }
    }
}
