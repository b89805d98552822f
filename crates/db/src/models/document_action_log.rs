//! Action log entity model (append-only, no `updated_at`).

use atrium_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A single lifecycle action record. Immutable once created.
///
/// Rows for one document are totally ordered by `(action_at, id)`; `id` is
/// the insertion-sequence tie-break for timestamps that collide.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentActionLog {
    pub id: DbId,
    pub document_id: DbId,
    pub action: String,
    pub actor_id: Option<DbId>,
    pub detail: Option<String>,
    pub action_at: Timestamp,
}
