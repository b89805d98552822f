//! Repository for the `document_action_logs` table (append-only audit trail).

use atrium_core::tenant::Tenant;
use atrium_core::types::DbId;
use sqlx::PgPool;

use crate::models::document_action_log::DocumentActionLog;

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, document_id, action, actor_id, detail, action_at";

/// Read side of the action log. Entries are only ever inserted inside the
/// workflow transaction, alongside the state change they record.
pub struct ActionLogRepo;

impl ActionLogRepo {
    /// List all log entries for a document, ascending by `(action_at, id)`.
    ///
    /// The `id` tie-break keeps entries committed within the same clock tick
    /// in insertion order.
    pub async fn list_by_document(
        pool: &PgPool,
        tenant: &Tenant,
        document_id: DbId,
    ) -> Result<Vec<DocumentActionLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE document_id = $1 ORDER BY action_at ASC, id ASC",
            tenant.table("document_action_logs")
        );
        sqlx::query_as::<_, DocumentActionLog>(&query)
            .bind(document_id)
            .fetch_all(pool)
            .await
    }
}
