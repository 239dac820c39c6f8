use sdui_core::error::CoreError;
use sdui_storage::StorageError;

/// Internal error type for the build and rollback pipelines. Never crosses
/// the subsystem boundary as `Err`; the public APIs render it into the
/// `error` field of a structured result.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A referenced ledger row is missing (or owned by another tenant,
    /// which is deliberately indistinguishable).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Rollback target has never produced an artifact.
    #[error("Deployment has no artifact — cannot rollback to an unbuilt deployment")]
    NoArtifact,

    /// A concurrent transition won the race for this target. Retryable.
    #[error("Deployment was transitioned concurrently; retry the operation")]
    Conflict,

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_messages_are_stable() {
        // These strings are part of the public contract: they surface in
        // BuildResult.error and in the persisted error_message column.
        assert_eq!(EngineError::NotFound("Deployment").to_string(), "Deployment not found");
        assert_eq!(
            EngineError::NotFound("Template instance").to_string(),
            "Template instance not found"
        );
        assert_eq!(
            EngineError::NotFound("Template version").to_string(),
            "Template version not found"
        );
    }

    #[test]
    fn no_artifact_message_is_stable() {
        assert_eq!(
            EngineError::NoArtifact.to_string(),
            "Deployment has no artifact — cannot rollback to an unbuilt deployment"
        );
    }
}
