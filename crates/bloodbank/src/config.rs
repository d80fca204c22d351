//! Configuration management for bloodbank.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "bloodbank";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "registry.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `BLOODBANK_`, `__` between levels)
/// 2. TOML config file at `~/.config/bloodbank/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Registration form configuration.
    pub registration: RegistrationConfig,
    /// Terminal display configuration.
    pub display: DisplayConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/bloodbank/registry.db`
    pub database_path: Option<PathBuf>,
}

/// Registration form configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Youngest age accepted without an extra confirmation.
    pub min_age: i64,
    /// Oldest age accepted without an extra confirmation.
    pub max_age: i64,
}

/// Terminal display configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Width in characters of the progress bar drawn for each group.
    pub bar_width: usize,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            min_age: 16,
            max_age: 75,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { bar_width: 20 }
    }
}

impl RegistrationConfig {
    /// Whether `age` falls inside the typical donation range.
    #[must_use]
    pub fn age_in_range(&self, age: i64) -> bool {
        (self.min_age..=self.max_age).contains(&age)
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("BLOODBANK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.registration.min_age > self.registration.max_age {
            return Err(Error::ConfigValidation {
                message: format!(
                    "min_age ({}) cannot be greater than max_age ({})",
                    self.registration.min_age, self.registration.max_age
                ),
            });
        }

        if self.display.bar_width == 0 {
            return Err(Error::ConfigValidation {
                message: "bar_width must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert_eq!(config.registration.min_age, 16);
        assert_eq!(config.registration.max_age, 75);
        assert_eq!(config.display.bar_width, 20);
    }

    #[test]
    fn test_age_in_range_is_inclusive() {
        let registration = RegistrationConfig::default();

        assert!(registration.age_in_range(16));
        assert!(registration.age_in_range(75));
        assert!(!registration.age_in_range(15));
        assert!(!registration.age_in_range(76));
        assert!(!registration.age_in_range(-3));
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_inverted_age_range() {
        let mut config = Config::default();
        config.registration.min_age = 80;
        config.registration.max_age = 18;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("min_age"));
    }

    #[test]
    fn test_validate_zero_bar_width() {
        let mut config = Config::default();
        config.display.bar_width = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("bar_width"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("registry.db"));
        assert!(path.to_string_lossy().contains("bloodbank"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/donors.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/donors.sqlite")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("bloodbank"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[registration]\nmin_age = 18\nmax_age = 65\n\n[display]\nbar_width = 10\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.registration.min_age, 18);
        assert_eq!(config.registration.max_age, 65);
        assert_eq!(config.display.bar_width, 10);
    }

    #[test]
    fn test_load_rejects_invalid_toml_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display]\nbar_width = 0\n").unwrap();

        let result = Config::load_from(Some(path));
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));
    }

    #[test]
    fn test_registration_config_deserialize_partial() {
        let json = r#"{"max_age": 60}"#;
        let registration: RegistrationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(registration.min_age, 16);
        assert_eq!(registration.max_age, 60);
    }
}
