use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoardError>;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column already exists: {0}")]
    ColumnExists(String),

    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Task {task} is not at position {index} in column {column}")]
    StaleTaskPosition {
        task: String,
        column: String,
        index: usize,
    },

    #[error("Operation leaves the board unchanged")]
    NoChange,

    #[error("Invalid id: {0:?}")]
    InvalidId(String),

    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    #[error("Unsupported persisted state version: {0}")]
    UnsupportedVersion(u32),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
