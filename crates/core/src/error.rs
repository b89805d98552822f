use crate::document::{DocumentAction, DocumentStatus};
use crate::types::DbId;

/// Domain error taxonomy shared by the db and api layers.
///
/// Every variant is terminal for the operation that raised it: the workflow
/// never commits partial state and never coerces an illegal request into the
/// closest legal one.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Action {action} is not allowed while the document is {status}")]
    IllegalTransition {
        status: DocumentStatus,
        action: DocumentAction,
    },

    /// Concurrent updates on one document kept colliding (lost version
    /// reservations, serialization failures) after the workflow's internal
    /// retries were exhausted.
    #[error("Concurrent update conflict on document {document_id}")]
    VersionConflict { document_id: DbId },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
