use crate::error::Result;
use async_trait::async_trait;

#[cfg(feature = "file-storage")]
pub mod file_storage;
pub mod memory_storage;

#[cfg(feature = "file-storage")]
pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;

/// Key-value blob storage for persisted board state
#[async_trait]
pub trait Storage: Send + Sync {
    /// Reads the blob stored under `key`, if any
    async fn load(&self, key: &str) -> Result<Option<String>>;

    /// Stores `blob` under `key`, replacing any previous value
    async fn save(&self, key: &str, blob: &str) -> Result<()>;

    /// Removes the blob under `key`; missing keys are not an error
    async fn remove(&self, key: &str) -> Result<()>;
}
