#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Artifact serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid storage configuration: {0}")]
    Config(String),
}
