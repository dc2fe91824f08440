//! Error types shared by every hashing and manifest operation.
//!
//! Library code returns [`HashError`]; only the binary turns it into an exit
//! code and a printed message.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, HashError>;

/// Failure kinds surfaced by the core operations.
#[derive(Debug, Error)]
pub enum HashError {
    /// Growing an in-memory collection failed; the whole batch is abandoned.
    #[error("Out of memory while collecting files under {}", root.display())]
    Allocation {
        /// Root of the traversal that was abandoned
        root: PathBuf,
    },

    /// A file could not be opened for hashing.
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        /// File that could not be opened
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A file was opened but reading its content failed part way through.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// File whose content could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The manifest to verify or search could not be opened.
    #[error("Failed to open manifest {}: {source}", path.display())]
    ManifestOpen {
        /// Manifest path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The manifest could not be created, written or published.
    #[error("Failed to write manifest {}: {source}", path.display())]
    ManifestWrite {
        /// Destination manifest path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The manifest and digest lists handed to the writer are not index-aligned.
    #[error("Digest list has {digests} entries but file list has {files}")]
    Misaligned {
        /// Number of files
        files: usize,
        /// Number of digest slots
        digests: usize,
    },

    /// The worker pool could not be started.
    #[error("Failed to start hashing workers: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    /// The operation was cancelled before it completed.
    #[error("Operation cancelled")]
    Cancelled,
}

impl HashError {
    pub(crate) fn open(path: &Path, source: io::Error) -> Self {
        Self::Open {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn read(path: &Path, source: io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn manifest_open(path: &Path, source: io::Error) -> Self {
        Self::ManifestOpen {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn manifest_write(path: &Path, source: io::Error) -> Self {
        Self::ManifestWrite {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Short category name, used for diagnostics and log fields
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Allocation { .. } => "allocation",
            Self::Open { .. } | Self::ManifestOpen { .. } => "open",
            Self::Read { .. } => "read",
            Self::ManifestWrite { .. } => "write",
            Self::Misaligned { .. } => "misaligned",
            Self::Pool(_) => "pool",
            Self::Cancelled => "cancelled",
        }
    }
}
