use super::CommandStatus;
use crate::config::Config;
use crate::output;
use anyhow::Result;
use std::path::Path;

/// Execute config command to get/set configuration values
///
/// # Errors
///
/// Returns an error if:
/// - The configuration file is invalid
/// - The key or value is rejected
/// - Failed to save configuration
pub fn execute(
    config_path: &Path,
    key: Option<&str>,
    value: Option<&str>,
    list: bool,
) -> Result<CommandStatus> {
    let mut config = Config::load(config_path)?;

    let Some(key) = key.filter(|_| !list) else {
        show_all_config(&config);
        return Ok(CommandStatus::Clean);
    };

    if let Some(value) = value {
        config.set(key, value)?;
        config.save(config_path)?;
        output::success(&format!("Set {key} = {value}"));
        return Ok(CommandStatus::Clean);
    }

    if let Some(value) = config.get(key) {
        println!("{value}");
        Ok(CommandStatus::Clean)
    } else {
        output::warning(&format!("Unknown configuration key '{key}'"));
        Ok(CommandStatus::Failed)
    }
}

/// Show all configuration values
fn show_all_config(config: &Config) {
    output::section(
        "hashing",
        &[
            row("parallel_threads", config.hashing.parallel_threads),
            row("buffer_size", config.hashing.buffer_size),
        ],
    );

    println!();
    output::section(
        "manifest",
        &[
            row("file_name", &config.manifest.file_name),
            row("sort_paths", config.manifest.sort_paths),
            row("lookup", format!("{:?}", config.manifest.lookup).to_lowercase()),
        ],
    );

    println!();
    output::section(
        "manifest.exclude",
        &[
            row("suffixes", format!("{:?}", config.manifest.exclude.suffixes)),
            row(
                "substrings",
                format!("{:?}", config.manifest.exclude.substrings),
            ),
        ],
    );
}

fn row(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}
