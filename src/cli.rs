//! Command-line interface definitions for bulkhash.
//!
//! The CLI definitions are shared between the main binary and build tools
//! (like xtask) for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes, so we allow
//! missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for bulkhash.
#[derive(Parser)]
#[command(
    name = "bulkhash",
    version = crate::VERSION,
    about = "Parallel SHA-256 manifests for large file trees",
    long_about = "Generate, verify and query `path = digest` manifests, hashing files on a parallel worker pool"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output, including every skipped file
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Number of hashing threads (overrides the configuration file)
    #[arg(short = 'j', long, global = true, env = "BULKHASH_THREADS")]
    pub threads: Option<usize>,

    /// Configuration file to use
    #[arg(long, global = true, env = "BULKHASH_CONFIG_PATH")]
    pub config: Option<PathBuf>,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Print the SHA-256 digest of one or more files
    Hash {
        /// Files to hash
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Hash every file under a directory and write a manifest
    Generate {
        /// Directory to walk
        root: PathBuf,

        /// Manifest to write (default: <root>/SHA256)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sort entries by path for reproducible output
        #[arg(long)]
        sort: bool,
    },

    /// Re-hash every file listed in a manifest and report differences
    Check {
        /// Manifest to verify (default: ./SHA256)
        manifest: Option<PathBuf>,

        /// Directory relative entries resolve against (default: the manifest's directory)
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// Also fail when a listed file cannot be read
        #[arg(long)]
        strict: bool,
    },

    /// Print the recorded digest for a path
    Lookup {
        /// Path as recorded, or an absolute path under the manifest's directory
        path: String,

        /// Manifest to search (default: ./SHA256)
        manifest: Option<PathBuf>,

        /// Return the last matching entry instead of the first
        #[arg(long)]
        last: bool,
    },

    /// Get and set configuration options
    Config {
        /// Configuration key
        key: Option<String>,

        /// Configuration value to set
        value: Option<String>,

        /// List all configuration values
        #[arg(short, long)]
        list: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
