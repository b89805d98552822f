//! Repository for the `document_versions` table (version sequencer, read side).

use atrium_core::tenant::Tenant;
use atrium_core::types::DbId;
use sqlx::PgPool;

use crate::models::document_version::DocumentVersion;

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str =
    "id, document_id, version_no, file_ref, note, changed_at, created_by";

/// Read operations over the immutable version history. Version rows are
/// only ever inserted by the workflow transaction.
pub struct DocumentVersionRepo;

impl DocumentVersionRepo {
    /// List all versions of a document, ascending by version number.
    pub async fn list_by_document(
        pool: &PgPool,
        tenant: &Tenant,
        document_id: DbId,
    ) -> Result<Vec<DocumentVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE document_id = $1 ORDER BY version_no ASC",
            tenant.table("document_versions")
        );
        sqlx::query_as::<_, DocumentVersion>(&query)
            .bind(document_id)
            .fetch_all(pool)
            .await
    }

    /// Find a specific version of a document.
    pub async fn find_by_version(
        pool: &PgPool,
        tenant: &Tenant,
        document_id: DbId,
        version_no: i32,
    ) -> Result<Option<DocumentVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE document_id = $1 AND version_no = $2",
            tenant.table("document_versions")
        );
        sqlx::query_as::<_, DocumentVersion>(&query)
            .bind(document_id)
            .bind(version_no)
            .fetch_optional(pool)
            .await
    }

    /// The next version number for a document (max existing + 1, or 1 if
    /// none). Advisory outside a transaction; the workflow recomputes it
    /// under the document row lock before inserting.
    pub async fn next_version_no(
        pool: &PgPool,
        tenant: &Tenant,
        document_id: DbId,
    ) -> Result<i32, sqlx::Error> {
        let query = format!(
            "SELECT COALESCE(MAX(version_no), 0) + 1 FROM {} WHERE document_id = $1",
            tenant.table("document_versions")
        );
        sqlx::query_scalar::<_, i32>(&query)
            .bind(document_id)
            .fetch_one(pool)
            .await
    }
}
