/// Errors raised by the pure domain layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Caller-supplied input is missing or malformed. Surfaced
    /// immediately; never retried.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// An internal invariant was violated (ordinal gap, duplicated
    /// panel, drifted derivation). Indicates a planner or orchestrator
    /// bug, not a recoverable runtime condition.
    #[error("Consistency violation: {0}")]
    Consistency(String),

    /// A template or configuration authoring error.
    #[error("Internal error: {0}")]
    Internal(String),
}
