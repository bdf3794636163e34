//! Configuration for the `qtest` command harness.
//!
//! Settings are read from a TOML file; every field has a default so an empty
//! file (or no file at all) is valid:
//!
//! ```toml
//! [harness]
//! string_length = 1024   # removed strings are copied into string_length + 1 bytes
//! show_limit = 30        # elements printed by `show` before eliding
//! show_after = true      # print the queue after every mutating command
//! echo = false           # echo each command before running it
//! strategy = "merge"     # or "swap"
//! fault_period = 0       # refuse every Nth allocation (0 = never)
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::queue::SortStrategy;

/// Default capacity of the removal buffer, terminator excluded.
pub const DEFAULT_STRING_LENGTH: usize = 1024;

/// Default number of elements `show` prints.
pub const DEFAULT_SHOW_LIMIT: usize = 30;

/// Largest accepted removal buffer.
pub const MAX_STRING_LENGTH: usize = 1 << 20;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Root of the configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub harness: HarnessConfig,
}

/// Harness behaviour settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Maximum number of bytes reported for a removed string.
    pub string_length: usize,
    /// Maximum number of elements printed when showing the queue.
    pub show_limit: usize,
    /// Print the queue after each mutating command.
    pub show_after: bool,
    /// Echo each command line before executing it.
    pub echo: bool,
    /// Algorithm used by the `sort` command.
    pub strategy: SortStrategy,
    /// Refuse every Nth allocation (0 disables fault injection).
    pub fault_period: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            string_length: DEFAULT_STRING_LENGTH,
            show_limit: DEFAULT_SHOW_LIMIT,
            show_after: true,
            echo: false,
            strategy: SortStrategy::default(),
            fault_period: 0,
        }
    }
}

impl Config {
    /// Load configuration from the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (IO error)
    /// - The file contains invalid TOML syntax
    /// - A field has an invalid type or an unknown name
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration TOML.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

impl HarnessConfig {
    /// Validate settings.
    ///
    /// Returns a `ValidationResult` containing any non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if `string_length` exceeds [`MAX_STRING_LENGTH`].
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut warnings = Vec::new();

        if self.string_length > MAX_STRING_LENGTH {
            anyhow::bail!(
                "string_length {} exceeds maximum of {MAX_STRING_LENGTH}",
                self.string_length
            );
        }

        if self.string_length == 0 {
            warnings.push("string_length is 0: removed strings will always be empty".to_string());
        }

        if self.show_limit == 0 {
            warnings.push("show_limit is 0: queue contents will never be printed".to_string());
        }

        if self.fault_period == 1 {
            warnings.push("fault_period is 1: every allocation will fail".to_string());
        }

        Ok(ValidationResult { warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.harness, HarnessConfig::default());
        assert_eq!(config.harness.string_length, DEFAULT_STRING_LENGTH);
        assert!(config.harness.show_after);
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [harness]
            string_length = 8
            strategy = "swap"
            "#,
        )
        .unwrap();

        assert_eq!(config.harness.string_length, 8);
        assert_eq!(config.harness.strategy, SortStrategy::AdjacentSwap);
        assert_eq!(config.harness.show_limit, DEFAULT_SHOW_LIMIT);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = Config::parse("[harness]\nstring_len = 8\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[harness]\nfault_period = 5\necho = true").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.harness.fault_period, 5);
        assert!(config.harness.echo);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load_from("/nonexistent/qtest.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_validate_warnings() {
        let config = HarnessConfig {
            string_length: 0,
            fault_period: 1,
            ..Default::default()
        };
        let result = config.validate().unwrap();
        assert_eq!(result.warnings.len(), 2);
        assert!(result.has_warnings());
    }

    #[test]
    fn test_validate_rejects_huge_buffer() {
        let config = HarnessConfig {
            string_length: MAX_STRING_LENGTH + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_config_is_clean() {
        let result = HarnessConfig::default().validate().unwrap();
        assert!(!result.has_warnings());
    }
}
