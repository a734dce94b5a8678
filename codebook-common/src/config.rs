//! Configuration loading and config-file resolution
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `CODEBOOK_CONFIG` environment variable
//! 3. `~/.config/codebook/config.toml`
//! 4. Compiled defaults (fallback)
//!
//! A missing file never stops the pipeline: the resolver logs a warning and
//! falls back to compiled defaults. A file that exists but cannot be parsed is
//! reported as an error so that a typo does not silently change the lexicons.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "CODEBOOK_CONFIG";

/// Full TOML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub lexicon: LexiconConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter when neither `--log-level` nor `RUST_LOG` is set
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `[lexicon]` section: overrides for the classifier word lists
///
/// Each list that is present replaces the compiled-in list, or is appended to
/// it when `extend = true`. Absent lists keep the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LexiconConfig {
    #[serde(default)]
    pub extend: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub na_patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positive_words: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_words: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negators: Option<Vec<String>>,
}

impl LexiconConfig {
    /// True when no list is overridden
    pub fn is_default(&self) -> bool {
        self.na_patterns.is_none()
            && self.positive_words.is_none()
            && self.negative_words.is_none()
            && self.negators.is_none()
    }

    /// Merge an override list into a default list according to `extend`
    pub fn merge(&self, defaults: &[&str], overrides: Option<&Vec<String>>) -> Vec<String> {
        match overrides {
            None => defaults.iter().map(|s| s.to_string()).collect(),
            Some(list) if self.extend => defaults
                .iter()
                .map(|s| s.to_string())
                .chain(list.iter().cloned())
                .collect(),
            Some(list) => list.clone(),
        }
    }
}

/// `[export]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Missing codes written to the reversal guide when a variable has none
    #[serde(default = "default_missing_codes")]
    pub default_missing_codes: Vec<i64>,
    /// Characters of question text kept in CSV previews
    #[serde(default = "default_preview_chars")]
    pub question_preview_chars: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_missing_codes: default_missing_codes(),
            question_preview_chars: default_preview_chars(),
        }
    }
}

fn default_missing_codes() -> Vec<i64> {
    vec![-1, 7, 8, 9]
}

fn default_preview_chars() -> usize {
    100
}

/// Resolves which config file (if any) applies and loads it
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    /// Create resolver; `cli_path` is the `--config` argument, if given
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Determine the config file path by priority, without touching the file
    pub fn resolve_path(&self) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            debug!("Config path from command line: {}", path.display());
            return Some(path.clone());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                debug!("Config path from {}: {}", CONFIG_ENV_VAR, path);
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: user config directory
        default_config_path()
    }

    /// Load configuration, degrading to compiled defaults when no file exists
    pub fn load(&self) -> Result<TomlConfig> {
        let Some(path) = self.resolve_path() else {
            warn!("Could not determine config directory, using compiled defaults");
            return Ok(TomlConfig::default());
        };

        if !path.exists() {
            // An explicitly requested file that is missing is still not fatal
            if self.cli_path.is_some() {
                warn!("Config file {} not found, using compiled defaults", path.display());
            } else {
                debug!("No config file at {}, using compiled defaults", path.display());
            }
            return Ok(TomlConfig::default());
        }

        let config = load_toml_config(&path)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// `~/.config/codebook/config.toml` on the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("codebook").join("config.toml"))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Write a config file atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
