//! Configuration types for sniff-lint.

use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default cap on fix passes per file.
pub const DEFAULT_MAX_PASSES: usize = 10;

/// Top-level configuration, read from `sniff-lint.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset to use (e.g., "recommended", "strict", "minimal").
    #[serde(default)]
    pub preset: Option<String>,

    /// Severity threshold for a failing run (default: "error").
    #[serde(default)]
    pub fail_on: Option<String>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Fixer configuration.
    #[serde(default)]
    pub fixer: FixerConfig,

    /// Per-rule configurations.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }

    /// Gets the configuration block for a rule, if any.
    #[must_use]
    pub fn rule(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.rules.get(rule_name)
    }

    /// Severity at which a run counts as failed.
    ///
    /// Falls back to [`Severity::Error`] when unset or unparsable.
    #[must_use]
    pub fn fail_on_severity(&self) -> Severity {
        self.fail_on
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(Severity::Error)
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Glob patterns to include (if empty, all `*.php` files).
    #[serde(default)]
    pub include: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Maximum number of parallel file analyses.
    #[serde(default)]
    pub parallelism: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: vec!["**/vendor/**".to_string(), "**/node_modules/**".to_string()],
            include: Vec::new(),
            respect_gitignore: true,
            parallelism: None,
        }
    }
}

/// Fix loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixerConfig {
    /// Maximum number of lint-and-fix passes per file.
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,
}

impl Default for FixerConfig {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

fn default_max_passes() -> usize {
    DEFAULT_MAX_PASSES
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets an option value as a specific type.
    #[must_use]
    pub fn get_option<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| v.clone().try_into().ok())
    }

    /// Gets a boolean option with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Gets a non-negative integer option with a default value.
    #[must_use]
    pub fn get_usize(&self, key: &str, default: usize) -> usize {
        self.options
            .get(key)
            .and_then(toml::Value::as_integer)
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or(default)
    }

    /// Gets a string option with a default value.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.options
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.analyzer.respect_gitignore);
        assert!(config.rules.is_empty());
        assert_eq!(config.fixer.max_passes, DEFAULT_MAX_PASSES);
        assert_eq!(config.fail_on_severity(), Severity::Error);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
preset = "strict"
fail_on = "warning"

[analyzer]
root = "./src"
exclude = ["**/generated/**"]

[fixer]
max_passes = 4

[rules.array-declaration]
severity = "warning"
indent = 2
ignore_new_lines = false

[rules.valid-class-name]
enabled = false
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.analyzer.root, PathBuf::from("./src"));
        assert_eq!(config.fixer.max_passes, 4);
        assert_eq!(config.fail_on_severity(), Severity::Warning);
        assert!(config.is_rule_enabled("array-declaration"));
        assert!(!config.is_rule_enabled("valid-class-name"));
        assert_eq!(
            config.rule_severity("array-declaration"),
            Some(Severity::Warning)
        );

        let rule_config = config.rule("array-declaration").unwrap();
        assert_eq!(rule_config.get_usize("indent", 4), 2);
        assert!(!rule_config.get_bool("ignore_new_lines", true));
        assert_eq!(rule_config.get_str("missing", "dflt"), "dflt");
    }

    #[test]
    fn test_parse_error() {
        let err = Config::parse("preset = ").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config"));
    }
}
