//! Transactional document workflow.
//!
//! Single entry point for every mutation of a document's lifecycle. Each
//! operation runs in one transaction that locks the document row
//! (`SELECT ... FOR UPDATE`), validates the requested transition against the
//! state machine, reserves a version number when the action records one,
//! writes the new status/current_version, and appends exactly one action log
//! row -- or rolls the whole unit back. Operations on different documents
//! never contend; racing callers on one document serialize on the row lock,
//! so exactly one wins and the rest see the committed state.

use atrium_core::document::{
    normalize_category, normalize_title, normalize_visibility_scope, DocumentAction,
    DocumentStatus,
};
use atrium_core::error::CoreError;
use atrium_core::tenant::Tenant;
use atrium_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::document::{CreateDocument, Document, UpdateDocumentMeta};
use crate::models::document_action_log::DocumentActionLog;
use crate::models::document_version::{DocumentVersion, SubmitVersion};
use crate::repositories::{action_log_repo, document_repo, document_version_repo};
use crate::repositories::{ActionLogRepo, DocumentRepo, DocumentVersionRepo};

/// Attempts per operation before a transient conflict is surfaced.
const MAX_TX_ATTEMPTS: u32 = 3;

/// Error type for workflow operations: a domain error or a database failure.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The public workflow façade. All methods take the pool plus an explicit
/// tenant; nothing here reads ambient state.
pub struct DocumentWorkflow;

impl DocumentWorkflow {
    /// Create a document with its first version.
    ///
    /// The document starts in PENDING_APPROVAL with `current_version` unset;
    /// version 1 and a CREATE log row are written in the same transaction.
    pub async fn create(
        pool: &PgPool,
        tenant: &Tenant,
        input: &CreateDocument,
    ) -> Result<(Document, DocumentVersion), WorkflowError> {
        let title = normalize_title(&input.title)?;
        let category = normalize_category(&input.category)?;
        let scope = normalize_visibility_scope(input.visibility_scope.as_deref())?;
        if input.file_ref.trim().is_empty() {
            return Err(CoreError::Validation("file_ref must not be empty".into()).into());
        }

        let mut tx = pool.begin().await?;

        let insert_doc = format!(
            "INSERT INTO {} (category, title, visibility_scope, status, created_by) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {}",
            tenant.table("documents"),
            document_repo::COLUMNS
        );
        let document = sqlx::query_as::<_, Document>(&insert_doc)
            .bind(&category)
            .bind(&title)
            .bind(&scope)
            .bind(DocumentStatus::initial().as_str())
            .bind(input.created_by)
            .fetch_one(&mut *tx)
            .await?;

        let version = insert_version(
            &mut tx,
            tenant,
            document.id,
            1,
            &input.file_ref,
            input.note.as_deref(),
            input.created_by,
        )
        .await?;

        append_log(
            &mut tx,
            tenant,
            document.id,
            DocumentAction::Create,
            input.created_by,
            Some("Created as v1"),
        )
        .await?;

        tx.commit().await?;
        tracing::info!(document_id = document.id, tenant = %tenant, "Document created");
        Ok((document, version))
    }

    /// Submit a new version of an ACTIVE document, sending it back through
    /// approval. `current_version` is untouched until the next APPROVE.
    pub async fn submit_version(
        pool: &PgPool,
        tenant: &Tenant,
        document_id: DbId,
        input: &SubmitVersion,
        actor_id: Option<DbId>,
    ) -> Result<DocumentVersion, WorkflowError> {
        if input.file_ref.trim().is_empty() {
            return Err(CoreError::Validation("file_ref must not be empty".into()).into());
        }

        retry_serialized(document_id, || async move {
            let mut tx = pool.begin().await?;
            let document = lock_document(&mut tx, tenant, document_id).await?;
            let status: DocumentStatus = document.status.parse()?;
            let next = status.apply(DocumentAction::SubmitVersion)?;

            let next_no = next_version_no_locked(&mut tx, tenant, document_id).await?;
            let version = insert_version(
                &mut tx,
                tenant,
                document_id,
                next_no,
                &input.file_ref,
                input.note.as_deref(),
                input.created_by,
            )
            .await?;

            update_status(&mut tx, tenant, document_id, next, document.current_version).await?;

            let detail = match input.note.as_deref() {
                Some(note) => format!("v{next_no}: {note}"),
                None => format!("v{next_no}"),
            };
            append_log(
                &mut tx,
                tenant,
                document_id,
                DocumentAction::SubmitVersion,
                actor_id,
                Some(&detail),
            )
            .await?;

            tx.commit().await?;
            Ok(version)
        })
        .await
    }

    /// Apply a status-change action (APPROVE, REJECT, DEACTIVATE,
    /// REQUEST_DELETE, APPROVE_DELETE, REJECT_DELETE, REQUEST_REACTIVATE).
    ///
    /// APPROVE additionally points `current_version` at the highest recorded
    /// version number. Returns the updated document.
    pub async fn change_status(
        pool: &PgPool,
        tenant: &Tenant,
        document_id: DbId,
        action: DocumentAction,
        actor_id: Option<DbId>,
        detail: Option<&str>,
    ) -> Result<Document, WorkflowError> {
        if !action.is_status_change() {
            return Err(CoreError::Validation(format!(
                "Action {action} cannot be applied through a status change"
            ))
            .into());
        }

        retry_serialized(document_id, || async move {
            let mut tx = pool.begin().await?;
            let document = lock_document(&mut tx, tenant, document_id).await?;
            let status: DocumentStatus = document.status.parse()?;
            let next = status.apply(action)?;

            let current_version = if action == DocumentAction::Approve {
                latest_version_no_locked(&mut tx, tenant, document_id).await?
            } else {
                document.current_version
            };

            let updated = update_status(&mut tx, tenant, document_id, next, current_version).await?;
            append_log(&mut tx, tenant, document_id, action, actor_id, detail).await?;

            tx.commit().await?;
            tracing::info!(
                document_id,
                tenant = %tenant,
                from = %status,
                action = %action,
                to = %next,
                "Document status changed"
            );
            Ok(updated)
        })
        .await
    }

    /// Edit title/category/visibility scope of an ACTIVE document.
    ///
    /// A real change re-enters PENDING_APPROVAL and logs UPDATE_METADATA
    /// with the old and new values; a no-op edit leaves the document
    /// untouched and writes nothing.
    pub async fn update_metadata(
        pool: &PgPool,
        tenant: &Tenant,
        document_id: DbId,
        input: &UpdateDocumentMeta,
        actor_id: Option<DbId>,
    ) -> Result<Document, WorkflowError> {
        let mut tx = pool.begin().await?;
        let document = lock_document(&mut tx, tenant, document_id).await?;
        let status: DocumentStatus = document.status.parse()?;
        let next = status.apply(DocumentAction::UpdateMetadata)?;

        let mut changes: Vec<String> = Vec::new();
        let mut title = document.title.clone();
        let mut category = document.category.clone();
        let mut scope = document.visibility_scope.clone();

        if let Some(ref raw) = input.title {
            let normalized = normalize_title(raw)?;
            if normalized != document.title {
                changes.push(format!("title: \"{}\" -> \"{normalized}\"", document.title));
                title = normalized;
            }
        }
        if let Some(ref raw) = input.category {
            let normalized = normalize_category(raw)?;
            if normalized != document.category {
                changes.push(format!(
                    "category: \"{}\" -> \"{normalized}\"",
                    document.category
                ));
                category = normalized;
            }
        }
        if let Some(ref raw) = input.visibility_scope {
            let normalized = normalize_visibility_scope(Some(raw))?;
            if normalized != document.visibility_scope {
                changes.push(format!(
                    "visibility_scope: \"{}\" -> \"{}\"",
                    document.visibility_scope.as_deref().unwrap_or("(none)"),
                    normalized.as_deref().unwrap_or("(none)")
                ));
                scope = normalized;
            }
        }

        if changes.is_empty() {
            tx.rollback().await?;
            return Ok(document);
        }

        let query = format!(
            "UPDATE {} SET title = $2, category = $3, visibility_scope = $4, \
                 status = $5, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {}",
            tenant.table("documents"),
            document_repo::COLUMNS
        );
        let updated = sqlx::query_as::<_, Document>(&query)
            .bind(document_id)
            .bind(&title)
            .bind(&category)
            .bind(&scope)
            .bind(next.as_str())
            .fetch_one(&mut *tx)
            .await?;

        let detail = changes.join("; ");
        append_log(
            &mut tx,
            tenant,
            document_id,
            DocumentAction::UpdateMetadata,
            actor_id,
            Some(&detail),
        )
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Flag an INACTIVE document as deleted, removing it from default
    /// listings. The status is untouched; this is not a state transition.
    pub async fn soft_delete(
        pool: &PgPool,
        tenant: &Tenant,
        document_id: DbId,
        actor_id: Option<DbId>,
        reason: Option<&str>,
    ) -> Result<Document, WorkflowError> {
        let mut tx = pool.begin().await?;
        let document = lock_document(&mut tx, tenant, document_id).await?;
        let status: DocumentStatus = document.status.parse()?;
        if status != DocumentStatus::Inactive {
            return Err(CoreError::IllegalTransition {
                status,
                action: DocumentAction::SoftDelete,
            }
            .into());
        }
        if document.is_delete {
            return Err(CoreError::Conflict(format!(
                "Document {document_id} is already deleted"
            ))
            .into());
        }

        let updated = set_delete_flag(&mut tx, tenant, document_id, true).await?;
        append_log(
            &mut tx,
            tenant,
            document_id,
            DocumentAction::SoftDelete,
            actor_id,
            reason,
        )
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Clear the soft-delete flag, returning the document to listings.
    pub async fn restore(
        pool: &PgPool,
        tenant: &Tenant,
        document_id: DbId,
        actor_id: Option<DbId>,
        reason: Option<&str>,
    ) -> Result<Document, WorkflowError> {
        let mut tx = pool.begin().await?;
        let document = lock_document(&mut tx, tenant, document_id).await?;
        if !document.is_delete {
            return Err(CoreError::Conflict(format!(
                "Document {document_id} is not deleted"
            ))
            .into());
        }

        let updated = set_delete_flag(&mut tx, tenant, document_id, false).await?;
        append_log(
            &mut tx,
            tenant,
            document_id,
            DocumentAction::Restore,
            actor_id,
            reason,
        )
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Fetch a document or fail with NotFound.
    pub async fn get(
        pool: &PgPool,
        tenant: &Tenant,
        document_id: DbId,
    ) -> Result<Document, WorkflowError> {
        DocumentRepo::find_by_id(pool, tenant, document_id)
            .await?
            .ok_or_else(|| not_found(document_id).into())
    }

    /// List a document's versions, ascending by version number.
    pub async fn versions(
        pool: &PgPool,
        tenant: &Tenant,
        document_id: DbId,
    ) -> Result<Vec<DocumentVersion>, WorkflowError> {
        ensure_exists(pool, tenant, document_id).await?;
        Ok(DocumentVersionRepo::list_by_document(pool, tenant, document_id).await?)
    }

    /// Fetch one specific version of a document.
    pub async fn version(
        pool: &PgPool,
        tenant: &Tenant,
        document_id: DbId,
        version_no: i32,
    ) -> Result<DocumentVersion, WorkflowError> {
        ensure_exists(pool, tenant, document_id).await?;
        DocumentVersionRepo::find_by_version(pool, tenant, document_id, version_no)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "DocumentVersion",
                    id: DbId::from(version_no),
                }
                .into()
            })
    }

    /// List a document's action log, ascending by `(action_at, id)`.
    pub async fn logs(
        pool: &PgPool,
        tenant: &Tenant,
        document_id: DbId,
    ) -> Result<Vec<DocumentActionLog>, WorkflowError> {
        ensure_exists(pool, tenant, document_id).await?;
        Ok(ActionLogRepo::list_by_document(pool, tenant, document_id).await?)
    }
}

// ---------------------------------------------------------------------------
// Transaction helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Document",
        id,
    }
}

async fn ensure_exists(
    pool: &PgPool,
    tenant: &Tenant,
    document_id: DbId,
) -> Result<(), WorkflowError> {
    if DocumentRepo::exists(pool, tenant, document_id).await? {
        Ok(())
    } else {
        Err(not_found(document_id).into())
    }
}

/// Lock the document row for the remainder of the transaction.
async fn lock_document(
    conn: &mut PgConnection,
    tenant: &Tenant,
    document_id: DbId,
) -> Result<Document, WorkflowError> {
    let query = format!(
        "SELECT {} FROM {} WHERE id = $1 FOR UPDATE",
        document_repo::COLUMNS,
        tenant.table("documents")
    );
    sqlx::query_as::<_, Document>(&query)
        .bind(document_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| not_found(document_id).into())
}

/// Next version number, computed under the document row lock so two
/// submitters cannot reserve the same number.
async fn next_version_no_locked(
    conn: &mut PgConnection,
    tenant: &Tenant,
    document_id: DbId,
) -> Result<i32, sqlx::Error> {
    let query = format!(
        "SELECT COALESCE(MAX(version_no), 0) + 1 FROM {} WHERE document_id = $1",
        tenant.table("document_versions")
    );
    sqlx::query_scalar::<_, i32>(&query)
        .bind(document_id)
        .fetch_one(conn)
        .await
}

async fn latest_version_no_locked(
    conn: &mut PgConnection,
    tenant: &Tenant,
    document_id: DbId,
) -> Result<Option<i32>, sqlx::Error> {
    let query = format!(
        "SELECT MAX(version_no) FROM {} WHERE document_id = $1",
        tenant.table("document_versions")
    );
    sqlx::query_scalar::<_, Option<i32>>(&query)
        .bind(document_id)
        .fetch_one(conn)
        .await
}

async fn insert_version(
    conn: &mut PgConnection,
    tenant: &Tenant,
    document_id: DbId,
    version_no: i32,
    file_ref: &str,
    note: Option<&str>,
    created_by: Option<DbId>,
) -> Result<DocumentVersion, sqlx::Error> {
    let query = format!(
        "INSERT INTO {} (document_id, version_no, file_ref, note, created_by) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {}",
        tenant.table("document_versions"),
        document_version_repo::COLUMNS
    );
    sqlx::query_as::<_, DocumentVersion>(&query)
        .bind(document_id)
        .bind(version_no)
        .bind(file_ref)
        .bind(note)
        .bind(created_by)
        .fetch_one(conn)
        .await
}

async fn update_status(
    conn: &mut PgConnection,
    tenant: &Tenant,
    document_id: DbId,
    status: DocumentStatus,
    current_version: Option<i32>,
) -> Result<Document, sqlx::Error> {
    let query = format!(
        "UPDATE {} SET status = $2, current_version = $3, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {}",
        tenant.table("documents"),
        document_repo::COLUMNS
    );
    sqlx::query_as::<_, Document>(&query)
        .bind(document_id)
        .bind(status.as_str())
        .bind(current_version)
        .fetch_one(conn)
        .await
}

async fn set_delete_flag(
    conn: &mut PgConnection,
    tenant: &Tenant,
    document_id: DbId,
    deleted: bool,
) -> Result<Document, sqlx::Error> {
    let query = format!(
        "UPDATE {} SET is_delete = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
        tenant.table("documents"),
        document_repo::COLUMNS
    );
    sqlx::query_as::<_, Document>(&query)
        .bind(document_id)
        .bind(deleted)
        .fetch_one(conn)
        .await
}

async fn append_log(
    conn: &mut PgConnection,
    tenant: &Tenant,
    document_id: DbId,
    action: DocumentAction,
    actor_id: Option<DbId>,
    detail: Option<&str>,
) -> Result<DocumentActionLog, sqlx::Error> {
    let query = format!(
        "INSERT INTO {} (document_id, action, actor_id, detail) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {}",
        tenant.table("document_action_logs"),
        action_log_repo::COLUMNS
    );
    sqlx::query_as::<_, DocumentActionLog>(&query)
        .bind(document_id)
        .bind(action.as_str())
        .bind(actor_id)
        .bind(detail)
        .fetch_one(conn)
        .await
}

// ---------------------------------------------------------------------------
// Conflict retry
// ---------------------------------------------------------------------------

/// Run `op` up to [`MAX_TX_ATTEMPTS`] times, retrying on retriable database
/// failures: a unique violation on the per-document version constraint
/// (concurrent reservation) or a serialization/deadlock failure. Anything
/// else propagates immediately.
async fn retry_serialized<T, F, Fut>(document_id: DbId, mut op: F) -> Result<T, WorkflowError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, WorkflowError>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(WorkflowError::Database(err)) if is_retriable(&err) => {
                if attempt >= MAX_TX_ATTEMPTS {
                    tracing::warn!(
                        document_id,
                        error = %err,
                        "Giving up after repeated transaction conflicts"
                    );
                    return Err(CoreError::VersionConflict { document_id }.into());
                }
                tracing::warn!(
                    document_id,
                    attempt,
                    error = %err,
                    "Retrying document transaction after conflict"
                );
                attempt += 1;
            }
            Err(other) => return Err(other),
        }
    }
}

/// PostgreSQL error codes worth retrying: 23505 (unique violation, a lost
/// version reservation race), 40001 (serialization failure), 40P01
/// (deadlock detected).
fn is_retriable(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => matches!(
            db_err.code().as_deref(),
            Some("23505") | Some("40001") | Some("40P01")
        ),
        _ => false,
    }
}
