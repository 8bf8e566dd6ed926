//! Configuration module
//!
//! Reads `~/.config/railway-tariffs/config.toml`. Every key is optional; a
//! missing file yields the defaults.
//!
//! ```toml
//! [storage]
//! use_database = true
//! database_path = "/var/lib/railway/railway.db"
//! error_log_path = "db_errors.log"
//!
//! [logging]
//! level = "info"
//! format = "text"   # or "json"
//!
//! [catalog]
//! seed_sample_data = false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::shared::errors::InfraError;

const APP_DIR: &str = "railway-tariffs";
const DATA_DIR: &str = "RailwayApp";

/// Location of the config file when none is given explicitly.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

/// Directory holding the database file by default.
pub fn default_data_dir() -> PathBuf {
    dirs_next::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Try the database at startup; `false` forces the in-memory backend.
    pub use_database: bool,
    pub database_path: PathBuf,
    /// Where a failed startup probe records its error.
    pub error_log_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            use_database: true,
            database_path: default_data_dir().join("railway.db"),
            error_log_path: PathBuf::from("db_errors.log"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Add the sample tariffs when the catalogue starts empty.
    pub seed_sample_data: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            seed_sample_data: false,
        }
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self, InfraError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self, InfraError> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [storage]
            use_database = false

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert!(!cfg.storage.use_database);
        assert_eq!(cfg.storage.error_log_path, PathBuf::from("db_errors.log"));
        assert!(cfg.storage.database_path.ends_with("RailwayApp/railway.db"));
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.logging.format, "json");
        assert!(!cfg.catalog.seed_sample_data);
    }

    #[test]
    fn test_seeding_can_be_enabled() {
        let cfg = AppConfig::from_toml("[catalog]\nseed_sample_data = true\n").unwrap();
        assert!(cfg.catalog.seed_sample_data);
        assert!(!AppConfig::default().catalog.seed_sample_data);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert!(cfg.storage.use_database);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(matches!(
            AppConfig::from_toml("[storage]\nuse_database = \"maybe\""),
            Err(InfraError::Config(_))
        ));
    }
}
