//! TOML configuration for bulkhash.

/// Parsing and range checks.
pub mod parser;
/// Unknown-key warnings.
pub mod validator;

use crate::hasher::HashOptions;
use crate::lookup::MatchPolicy;
use crate::manifest::{DEFAULT_MANIFEST_NAME, ExclusionRules};
use crate::scanner::WalkOptions;
use crate::utils::hash::DEFAULT_BUFFER_SIZE;
use crate::utils::thread_pool::default_workers;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Environment variable overriding the configuration file location
pub const CONFIG_PATH_ENV: &str = "BULKHASH_CONFIG_PATH";

/// Largest accepted read buffer
pub const MAX_BUFFER_SIZE: usize = 64 * 1024 * 1024;

/// Largest accepted worker count
pub const MAX_THREADS: usize = 1024;

/// Top-level configuration file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Worker and buffer tuning
    #[serde(default)]
    pub hashing: HashingConfig,

    /// Manifest naming, ordering and exclusion
    #[serde(default)]
    pub manifest: ManifestConfig,
}

/// `[hashing]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashingConfig {
    /// Worker threads per invocation
    #[serde(default = "default_workers")]
    pub parallel_threads: usize,
    /// Bytes read per call, per worker
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

/// `[manifest]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// File name used when no manifest path is given
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// Sort the file list before hashing so output order is stable across machines
    #[serde(default)]
    pub sort_paths: bool,
    /// Which record wins when a lookup finds duplicates
    #[serde(default)]
    pub lookup: MatchPolicy,
    /// Paths left out of generated manifests
    #[serde(default)]
    pub exclude: ExclusionRules,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            parallel_threads: default_workers(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
            sort_paths: false,
            lookup: MatchPolicy::First,
            exclude: ExclusionRules::default(),
        }
    }
}

impl Config {
    /// Default location: `$BULKHASH_CONFIG_PATH`, else `<config dir>/bulkhash/config.toml`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("bulkhash").join("config.toml"))
    }

    /// Load configuration from a file
    ///
    /// A missing file yields the defaults; nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML
    /// - A value fails validation
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        parser::parse_config_file(path)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint
    pub fn validate(&self) -> Result<()> {
        parser::validate_config(self)
    }

    /// Hashing options derived from this configuration
    #[must_use]
    pub fn hash_options(&self) -> HashOptions {
        HashOptions {
            threads: self.hashing.parallel_threads,
            buffer_size: self.hashing.buffer_size,
            cancel: None,
        }
    }

    /// Traversal options derived from this configuration
    #[must_use]
    pub const fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            sort: self.manifest.sort_paths,
        }
    }

    /// Get a configuration value by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();
        if parts.len() != 2 {
            return None;
        }

        match (parts[0], parts[1]) {
            ("hashing", "parallel_threads") => Some(self.hashing.parallel_threads.to_string()),
            ("hashing", "buffer_size") => Some(self.hashing.buffer_size.to_string()),
            ("manifest", "file_name") => Some(self.manifest.file_name.clone()),
            ("manifest", "sort_paths") => Some(self.manifest.sort_paths.to_string()),
            ("manifest", "lookup") => Some(format!("{:?}", self.manifest.lookup).to_lowercase()),
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The key format is invalid (must be section.key)
    /// - The key is unknown
    /// - The value is invalid for the key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();
        if parts.len() != 2 {
            return Err(anyhow::anyhow!("Invalid configuration key: {key}"));
        }

        match (parts[0], parts[1]) {
            ("hashing", "parallel_threads") => {
                self.hashing.parallel_threads = value
                    .parse()
                    .with_context(|| format!("Invalid number: {value}"))?;
            }
            ("hashing", "buffer_size") => {
                self.hashing.buffer_size = value
                    .parse()
                    .with_context(|| format!("Invalid number: {value}"))?;
            }
            ("manifest", "file_name") => self.manifest.file_name = value.to_string(),
            ("manifest", "sort_paths") => {
                self.manifest.sort_paths = value
                    .parse()
                    .with_context(|| format!("Invalid boolean: {value}"))?;
            }
            ("manifest", "lookup") => {
                self.manifest.lookup = match value {
                    "first" => MatchPolicy::First,
                    "last" => MatchPolicy::Last,
                    _ => return Err(anyhow::anyhow!("Lookup policy must be 'first' or 'last'")),
                };
            }
            _ => return Err(anyhow::anyhow!("Unknown configuration key: {key}")),
        }

        self.validate()
    }
}

fn default_file_name() -> String {
    DEFAULT_MANIFEST_NAME.to_string()
}

const fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}
