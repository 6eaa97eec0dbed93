//! Configuration management
//!
//! This module handles loading, saving, and migrating the s3up configuration file.
//! The configuration file is stored in TOML format at ~/.config/s3up/config.toml,
//! or under `$S3UP_CONFIG_DIR` when that variable is set.
//!
//! PROTECTED FILE: Changes to schema_version require migration support.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::job::{FailurePolicy, TraversalMode};
use crate::walk::DEFAULT_EXTENSION;

/// Current configuration schema version
///
/// IMPORTANT: Bumping this version requires:
/// 1. Adding a migration in `ConfigManager::migrate`
/// 2. Updating migration tests
/// 3. Marking the change as BREAKING
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "S3UP_CONFIG_DIR";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Default job settings
    #[serde(default)]
    pub defaults: Defaults,

    /// Storage endpoint settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Default settings applied when a flag is not given
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Extension filter
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Key prefix
    #[serde(default)]
    pub prefix: String,

    /// Concurrent transfers
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    #[serde(default)]
    pub traversal_mode: TraversalMode,

    #[serde(default)]
    pub follow_links: bool,

    /// Show progress spinner
    #[serde(default = "default_true")]
    pub progress: bool,
}

/// Where and how to reach the object store
///
/// Credentials are not stored here; they come from the SDK's default chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Custom endpoint URL for S3-compatible services
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Region override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Use path-style bucket addressing
    #[serde(default)]
    pub force_path_style: bool,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_concurrency() -> usize {
    1
}

fn default_true() -> bool {
    true
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            prefix: String::new(),
            concurrency: default_concurrency(),
            failure_policy: FailurePolicy::default(),
            traversal_mode: TraversalMode::default(),
            follow_links: false,
            progress: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
            storage: StorageConfig::default(),
        }
    }
}

/// Configuration manager handles loading and saving config
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    pub fn new() -> Result<Self> {
        let config_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("Could not determine config directory".into()))?
                .join("s3up"),
        };
        Ok(Self {
            config_path: config_dir.join("config.toml"),
        })
    }

    /// Create a ConfigManager with a custom path (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist, returns a default configuration.
    /// If the schema version doesn't match, attempts migration.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        if config.schema_version < SCHEMA_VERSION {
            config = self.migrate(config)?;
        } else if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade s3up.",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        Ok(config)
    }

    /// Save configuration to disk
    ///
    /// Creates parent directories if they don't exist.
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// Migrate configuration from older schema version
    fn migrate(&self, config: Config) -> Result<Config> {
        let mut config = config;

        // No migrations yet; version 0 files only lack the version field.
        config.schema_version = SCHEMA_VERSION;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let manager = ConfigManager::with_path(config_path);
        (manager, temp_dir)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
        assert_eq!(config.defaults.extension, ".csv");
        assert_eq!(config.defaults.concurrency, 1);
        assert_eq!(config.defaults.failure_policy, FailurePolicy::Continue);
        assert!(config.defaults.progress);
        assert!(config.storage.endpoint.is_none());
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let (manager, _temp_dir) = temp_config_manager();
        let config = manager.load().unwrap();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_save_and_load() {
        let (manager, _temp_dir) = temp_config_manager();

        let mut config = Config::default();
        config.defaults.prefix = "data-StateOfData2022/".to_string();
        config.defaults.concurrency = 4;
        config.storage.endpoint = Some("http://localhost:9000".to_string());
        config.storage.force_path_style = true;

        manager.save(&config).unwrap();
        let loaded = manager.load().unwrap();

        assert_eq!(loaded.defaults.prefix, "data-StateOfData2022/");
        assert_eq!(loaded.defaults.concurrency, 4);
        assert_eq!(loaded.storage.endpoint.as_deref(), Some("http://localhost:9000"));
        assert!(loaded.storage.force_path_style);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let (manager, _temp_dir) = temp_config_manager();
        std::fs::write(
            manager.config_path(),
            r#"
            schema_version = 1

            [defaults]
            failure_policy = "abort-on-first"
            "#,
        )
        .unwrap();

        let config = manager.load().unwrap();
        assert_eq!(config.defaults.failure_policy, FailurePolicy::AbortOnFirst);
        assert_eq!(config.defaults.extension, ".csv");
        assert_eq!(config.defaults.traversal_mode, TraversalMode::SkipUnreadable);
    }

    #[test]
    fn test_older_schema_is_migrated() {
        let (manager, _temp_dir) = temp_config_manager();
        std::fs::write(manager.config_path(), "schema_version = 0\n").unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_schema_version_too_new() {
        let (manager, _temp_dir) = temp_config_manager();

        let content = format!(
            r#"
            schema_version = {}
            "#,
            SCHEMA_VERSION + 1
        );
        std::fs::write(manager.config_path(), content).unwrap();

        let result = manager.load();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("newer than supported"));
    }
}
