/// Errors from the artifact storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The story could not be serialized to JSON.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
