use anyhow::Result;
use colored::Colorize;
use std::collections::HashSet;
use std::path::Path;

/// Recognised dotted keys. Sections are implied by their fields.
const KNOWN_FIELDS: &[&str] = &[
    "hashing.parallel_threads",
    "hashing.buffer_size",
    "manifest.file_name",
    "manifest.sort_paths",
    "manifest.lookup",
    "manifest.exclude.suffixes",
    "manifest.exclude.substrings",
];

/// Flags configuration keys that bulkhash ignores
pub struct ConfigValidator {
    /// Set of valid configuration fields
    known_fields: HashSet<&'static str>,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    /// Validator for the current set of keys
    #[must_use]
    pub fn new() -> Self {
        Self {
            known_fields: KNOWN_FIELDS.iter().copied().collect(),
        }
    }

    /// Unknown dotted keys in a TOML document, in document order
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML
    pub fn unknown_fields(&self, content: &str) -> Result<Vec<String>> {
        let parsed: toml::Value = toml::from_str(content)?;
        let mut unknown = Vec::new();
        self.check_table(&parsed, "", &mut unknown);
        Ok(unknown)
    }

    /// Print a warning block for unknown keys in a configuration file
    ///
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn validate_config_file(&self, config_path: &Path) -> Result<()> {
        if !config_path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(config_path)?;
        let unknown = self.unknown_fields(&content)?;
        if unknown.is_empty() {
            return Ok(());
        }

        eprintln!("{}", "Configuration warnings:".yellow().bold());
        for field in &unknown {
            tracing::warn!(field = %field, "Unknown configuration field");
            eprintln!("  Unknown configuration field: {}", field.yellow());
        }
        eprintln!();

        Ok(())
    }

    fn check_table(&self, table: &toml::Value, prefix: &str, unknown: &mut Vec<String>) {
        let toml::Value::Table(map) = table else {
            return;
        };

        for (key, value) in map {
            let full_key = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };

            if self.known_fields.contains(full_key.as_str()) {
                continue;
            }

            let is_section = self
                .known_fields
                .iter()
                .any(|field| field.starts_with(&format!("{full_key}.")));
            match value {
                toml::Value::Table(_) if is_section => {
                    self.check_table(value, &full_key, unknown);
                }
                _ => unknown.push(full_key),
            }
        }
    }
}
