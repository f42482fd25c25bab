//! Configuration types for apilint.

use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level configuration for apilint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Per-rule configurations, keyed by rule code (e.g. `GV1`).
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
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
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

    /// Checks if a structural rule is enabled. Rules are on unless disabled.
    #[must_use]
    pub fn is_rule_enabled(&self, code: &str) -> bool {
        self.rules
            .get(code)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Compiles the class exclude globs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pattern`] for the first invalid glob.
    pub fn exclude_patterns(&self) -> Result<Vec<Pattern>, ConfigError> {
        self.analyzer
            .exclude
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| ConfigError::Pattern {
                    pattern: p.clone(),
                    message: e.to_string(),
                })
            })
            .collect()
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Glob patterns over qualified class names to leave out of the diff
    /// (e.g. `org.example.internal.*`).
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,
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

    /// Invalid exclude glob.
    #[error("Invalid exclude pattern `{pattern}`: {message}")]
    Pattern {
        /// The pattern as written.
        pattern: String,
        /// Why it was rejected.
        message: String,
    },
}
