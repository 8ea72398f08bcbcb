use atelier_core::error::CoreError;
use atelier_core::types::EntityId;
use atelier_services::ServiceError;

/// Errors from the orchestration flows.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Request rejected before any external work.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The account cannot afford the requested operation. No external
    /// work was performed (or a losing concurrent settlement backed off
    /// cleanly).
    #[error("Insufficient credits")]
    InsufficientCredits,

    /// A referenced row does not exist.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: EntityId },

    /// An external service call failed.
    #[error("External service error: {0}")]
    Service(#[from] ServiceError),

    /// Text generation kept refusing until the attempt budget ran out.
    /// A refusal string is never surfaced as a prompt.
    #[error("Text generation refused after {attempts} attempts")]
    RefusalExhausted { attempts: u32 },

    /// Building the training archive failed.
    #[error("Archive error: {0}")]
    Archive(String),

    /// A database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A domain-level error bubbled up from `atelier-core`.
    #[error(transparent)]
    Core(#[from] CoreError),
}
