//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::calculate::{RateOptions, DEFAULT_WILSON_Z};
use crate::compare::DEFAULT_ACTIVITY_FLOOR;
use crate::models::{Role, RoleTable, DEFAULT_LOW_SAMPLE_THRESHOLD};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Rate derivation and ranking defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Entities with fewer matches than this are flagged as low sample
    #[serde(default = "default_low_sample_threshold")]
    pub low_sample_threshold: u32,

    /// z-score for the Wilson lower bound
    #[serde(default = "default_wilson_z")]
    pub wilson_z: f64,

    /// Match floor used by `rank` when the CLI does not set one
    #[serde(default)]
    pub default_min_matches: u32,

    #[serde(default = "default_top_n")]
    pub default_top_n: usize,
}

fn default_low_sample_threshold() -> u32 {
    DEFAULT_LOW_SAMPLE_THRESHOLD
}

fn default_wilson_z() -> f64 {
    DEFAULT_WILSON_Z
}

fn default_top_n() -> usize {
    10
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            low_sample_threshold: default_low_sample_threshold(),
            wilson_z: default_wilson_z(),
            default_min_matches: 0,
            default_top_n: default_top_n(),
        }
    }
}

/// Year-over-year comparison defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// Minimum baseline-year matches for a change leaderboard entry
    #[serde(default = "default_activity_floor")]
    pub activity_floor: u32,

    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

fn default_activity_floor() -> u32 {
    DEFAULT_ACTIVITY_FLOOR
}

fn default_limit() -> usize {
    10
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            activity_floor: default_activity_floor(),
            default_limit: default_limit(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// JSONL file of raw source rows
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub stats: StatsConfig,

    #[serde(default)]
    pub comparison: ComparisonConfig,

    /// Hero → role overrides layered on the builtin table
    #[serde(default)]
    pub roles: HashMap<String, Role>,
}

fn default_input() -> PathBuf {
    PathBuf::from("./data/matches.jsonl")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            log_level: default_log_level(),
            stats: StatsConfig::default(),
            comparison: ComparisonConfig::default(),
            roles: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            info!("Config file {:?} not found, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.stats.wilson_z.is_finite() || self.stats.wilson_z <= 0.0 {
            return Err(ConfigError::ValidationError(
                "Wilson z must be a positive number".to_string(),
            ));
        }

        if self.stats.low_sample_threshold == 0 {
            return Err(ConfigError::ValidationError(
                "Low sample threshold must be greater than 0".to_string(),
            ));
        }

        if self.stats.default_top_n == 0 {
            return Err(ConfigError::ValidationError(
                "Default top N must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn rate_options(&self) -> RateOptions {
        RateOptions {
            low_sample_threshold: self.stats.low_sample_threshold,
            wilson_z: self.stats.wilson_z,
        }
    }

    /// Builtin role table with the configured overrides applied.
    pub fn role_table(&self) -> RoleTable {
        RoleTable::builtin().with_overrides(
            self.roles
                .iter()
                .map(|(hero, role)| (hero.clone(), *role)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.input, PathBuf::from("./data/matches.jsonl"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.stats.low_sample_threshold, 20);
        assert_eq!(config.stats.wilson_z, 1.96);
        assert_eq!(config.comparison.activity_floor, 5);
        assert!(config.roles.is_empty());
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_z() {
        let mut config = AppConfig::default();
        config.stats.wilson_z = 0.0;
        assert!(config.validate().is_err());

        config.stats.wilson_z = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_threshold() {
        let mut config = AppConfig::default();
        config.stats.low_sample_threshold = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_top_n() {
        let mut config = AppConfig::default();
        config.stats.default_top_n = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file_with_partial_sections() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
input = "/srv/replays.jsonl"

[stats]
low_sample_threshold = 5

[roles]
"New Hero" = "Tank"
Muradin = "Ranged Assassin"
"#,
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.input, PathBuf::from("/srv/replays.jsonl"));
        assert_eq!(config.stats.low_sample_threshold, 5);
        assert_eq!(config.stats.wilson_z, 1.96);
        assert_eq!(config.comparison.default_limit, 10);

        let options = config.rate_options();
        assert_eq!(options.low_sample_threshold, 5);

        let table = config.role_table();
        assert_eq!(table.role_of("New Hero"), Role::Tank);
        assert_eq!(table.role_of("Muradin"), Role::RangedAssassin);
        assert_eq!(table.role_of("Valla"), Role::RangedAssassin);
    }

    #[test]
    fn test_config_from_file_rejects_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[stats]\nwilson_z = -1.0\n").unwrap();

        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::load_or_default(&temp_dir.path().join("none.toml")).unwrap();
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        // Should be parseable
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.input, parsed.input);
        assert_eq!(config.stats.default_top_n, parsed.stats.default_top_n);
    }
}
