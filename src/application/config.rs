// src/application/config.rs
//
// Application configuration
//
// Load order (highest wins):
// 1. CLI overrides (--database)
// 2. Config file (<config_dir>/bookverse/config.json or --config)
// 3. Built-in defaults
//
// A missing file means defaults; a malformed file is an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::repositories::DEFAULT_STORAGE_KEY;
use crate::services::DEFAULT_DEBOUNCE_MS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file; None means the platform data directory
    pub database_path: Option<PathBuf>,

    /// Key of the persisted collection
    pub storage_key: String,

    pub search_debounce_ms: u64,

    /// Source for `seed-demo --from-api` when no URL is given
    pub demo_api_url: Option<String>,

    /// Seed the sample catalog when the store starts empty
    pub seed_demo_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            search_debounce_ms: DEFAULT_DEBOUNCE_MS,
            demo_api_url: None,
            seed_demo_data: false,
        }
    }
}

impl AppConfig {
    /// `<config_dir>/bookverse/config.json`
    pub fn default_path() -> AppResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AppError::Config("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("bookverse").join("config.json"))
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;

        if config.storage_key.trim().is_empty() {
            return Err(AppError::Config("storage_key cannot be empty".to_string()));
        }

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.json")).unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.storage_key, "bookverse_books");
        assert_eq!(config.search_debounce_ms, 300);
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"seed_demo_data": true}"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert!(config.seed_demo_data);
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();

        assert!(matches!(AppConfig::load_from(&path), Err(AppError::Config(_))));
    }

    #[test]
    fn test_written_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = AppConfig {
            demo_api_url: Some("http://localhost:8080/api/books".to_string()),
            ..AppConfig::default()
        }
        .with_database_path(dir.path().join("books.db"));

        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }
}
