use vignette_core::error::CoreError;
use vignette_storage::StorageError;

/// Errors that abort a generation run.
///
/// Transient capability failures are deliberately absent: the
/// orchestrator contains them per panel (retry, then placeholder) and
/// they never surface as run failures.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Validation or consistency failure from the domain layer.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The storage write failed; no partial artifact was left behind.
    #[error("Persistence failed: {0}")]
    Persistence(#[from] StorageError),

    /// The run was cancelled before completion. Nothing was persisted.
    #[error("Generation run cancelled")]
    Cancelled,
}
