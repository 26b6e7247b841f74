use crate::{config::StoreConfig, error::Result, storage::Storage};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based storage: one `<key>.json` file per key inside a directory
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const EXTENSION: &'static str = "json";

    /// Creates a FileStorage rooted at `root`; the directory is created on
    /// first write
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root_path: root.as_ref().to_path_buf(),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(&config.storage_dir)
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn blob_file(&self, key: &str) -> PathBuf {
        self.root_path.join(format!("{}.{}", key, Self::EXTENSION))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    /// Writes to a temp file in the same directory, then renames it over the
    /// target so readers never observe a half-written blob
    async fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        let temp_file = tempfile::NamedTempFile::new_in(&self.root_path)?;
        let temp_path = temp_file.path().to_path_buf();

        fs::write(&temp_path, data).await?;
        fs::rename(&temp_path, path).await?;

        tracing::debug!("Atomically wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let file_path = self.blob_file(key);

        if !file_path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&file_path).await?;
        tracing::debug!("Read {} bytes from {}", contents.len(), file_path.display());
        Ok(Some(contents))
    }

    async fn save(&self, key: &str, blob: &str) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;
        self.write_atomic(&self.blob_file(key), blob.as_bytes()).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let file_path = self.blob_file(key);

        if file_path.exists() {
            fs::remove_file(file_path).await?;
        }
        Ok(())
    }
}
