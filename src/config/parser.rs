use super::{Config, MAX_BUFFER_SIZE, MAX_THREADS};
use anyhow::{Context, Result};
use std::path::Path;

/// Read, parse and validate a configuration file
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or holds
/// an out-of-range value.
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
}

/// Parse and validate configuration text
///
/// # Errors
///
/// Returns an error if the text is not valid TOML or holds an out-of-range value.
pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse TOML config")?;

    validate_config(&config)?;
    Ok(config)
}

/// Check value ranges that serde cannot express
///
/// # Errors
///
/// Returns the first violated constraint.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.hashing.parallel_threads == 0 {
        anyhow::bail!("Parallel threads must be at least 1");
    }
    if config.hashing.parallel_threads > MAX_THREADS {
        anyhow::bail!("Parallel threads cannot exceed {MAX_THREADS}");
    }

    if config.hashing.buffer_size == 0 {
        anyhow::bail!("Buffer size must be at least 1 byte");
    }
    if config.hashing.buffer_size > MAX_BUFFER_SIZE {
        anyhow::bail!("Buffer size cannot exceed 64MB");
    }

    let name = &config.manifest.file_name;
    if name.is_empty() || name.contains(['/', '\\']) {
        anyhow::bail!("Manifest file name must be a plain file name, got {name:?}");
    }

    if config
        .manifest
        .exclude
        .suffixes
        .iter()
        .chain(&config.manifest.exclude.substrings)
        .any(String::is_empty)
    {
        anyhow::bail!("Exclusion patterns cannot be empty");
    }

    Ok(())
}
