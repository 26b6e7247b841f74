use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where and under which key the board is persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "StoreConfig::default_storage_key")]
    pub storage_key: String,
    #[serde(default = "StoreConfig::default_storage_dir")]
    pub storage_dir: PathBuf,
}

impl StoreConfig {
    pub const DEFAULT_STORAGE_KEY: &'static str = "task-storage";
    const DEFAULT_STORAGE_DIR: &'static str = ".taskboard";

    fn default_storage_key() -> String {
        Self::DEFAULT_STORAGE_KEY.to_string()
    }

    fn default_storage_dir() -> PathBuf {
        PathBuf::from(Self::DEFAULT_STORAGE_DIR)
    }

    /// Parses a TOML document; missing keys fall back to defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| BoardError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a TOML config file, or the defaults when the file is absent
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> Result<()> {
        let key = self.storage_key.trim();
        if key.is_empty() {
            return Err(BoardError::ConfigError("storage_key must not be empty".to_string()));
        }
        if key.contains(['/', '\\']) {
            return Err(BoardError::ConfigError(format!(
                "storage_key must not contain path separators: {}",
                self.storage_key
            )));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: Self::default_storage_key(),
            storage_dir: Self::default_storage_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.storage_key, "task-storage");
        assert_eq!(config.storage_dir, PathBuf::from(".taskboard"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = StoreConfig::from_toml_str("storage_key = \"kanban-storage\"").unwrap();
        assert_eq!(config.storage_key, "kanban-storage");
        assert_eq!(config.storage_dir, PathBuf::from(".taskboard"));

        let config = StoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_invalid_keys_rejected() {
        assert!(matches!(
            StoreConfig::from_toml_str("storage_key = \"  \""),
            Err(BoardError::ConfigError(_))
        ));
        assert!(matches!(
            StoreConfig::from_toml_str("storage_key = \"../escape\""),
            Err(BoardError::ConfigError(_))
        ));
        assert!(matches!(
            StoreConfig::from_toml_str("storage_key = ["),
            Err(BoardError::ConfigError(_))
        ));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = StoreConfig::load(temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("board.toml");
        std::fs::write(&path, "storage_dir = \"/tmp/boards\"\n").unwrap();

        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/boards"));
        assert_eq!(config.storage_key, "task-storage");
    }
}
