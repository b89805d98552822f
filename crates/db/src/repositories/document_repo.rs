//! Repository for the `documents` table.

use atrium_core::document::DocumentStatus;
use atrium_core::error::CoreError;
use atrium_core::tenant::Tenant;
use atrium_core::types::DbId;
use sqlx::PgPool;

use crate::models::document::{Document, DocumentListing, DocumentPage, DocumentQuery};
use crate::workflow::WorkflowError;

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, category, title, visibility_scope, status, \
    current_version, is_delete, created_by, created_at, updated_at";

/// Provides read operations and filtered listings for documents.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Find a document by its internal ID. Soft-deleted rows are returned
    /// (the detail view stays reachable); listings filter them out.
    pub async fn find_by_id(
        pool: &PgPool,
        tenant: &Tenant,
        id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE id = $1",
            tenant.table("documents")
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a document with the given ID exists.
    pub async fn exists(pool: &PgPool, tenant: &Tenant, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)",
            tenant.table("documents")
        );
        sqlx::query_scalar::<_, bool>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List documents with filtering and pagination.
    ///
    /// Each row is joined with its display version: the current version when
    /// one has been approved, otherwise the latest submitted version. Rows
    /// flagged `is_delete` are excluded unless `include_deleted` is set.
    pub async fn search(
        pool: &PgPool,
        tenant: &Tenant,
        params: &DocumentQuery,
    ) -> Result<DocumentPage, WorkflowError> {
        let limit = params.limit.unwrap_or(50).clamp(1, 500);
        let offset = params.offset.unwrap_or(0).max(0);

        let (where_clause, bind_values, bind_idx) = build_document_filter(params)?;

        let docs = tenant.table("documents");
        let vers = tenant.table("document_versions");

        let query = format!(
            "SELECT d.id, d.category, d.title, d.visibility_scope, d.status, \
                    d.current_version, d.is_delete, d.created_by, d.created_at, \
                    lv.version_no AS latest_version_no, \
                    dv.file_ref, dv.note AS version_note, dv.changed_at \
             FROM {docs} d \
             JOIN LATERAL ( \
                 SELECT version_no FROM {vers} v \
                 WHERE v.document_id = d.id \
                 ORDER BY v.version_no DESC LIMIT 1 \
             ) lv ON TRUE \
             JOIN {vers} dv ON dv.document_id = d.id \
                AND dv.version_no = COALESCE(d.current_version, lv.version_no) \
             {where_clause} \
             ORDER BY d.created_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let mut q = sqlx::query_as::<_, DocumentListing>(&query);
        for val in &bind_values {
            q = q.bind(val.as_str());
        }
        let items = q.bind(limit).bind(offset).fetch_all(pool).await?;

        let count_query = format!("SELECT COUNT(*)::BIGINT FROM {docs} d {where_clause}");
        let mut cq = sqlx::query_scalar::<_, i64>(&count_query);
        for val in &bind_values {
            cq = cq.bind(val.as_str());
        }
        let total = cq.fetch_one(pool).await?;

        Ok(DocumentPage { items, total })
    }
}

/// Build a WHERE clause and bind values from document filter parameters.
///
/// Returns `(where_clause, bind_values, next_bind_index)`. All bind values
/// are text. Status filters use the groupings the admin screens expect:
/// INACTIVE also matches DELETED, and PENDING_APPROVAL also matches
/// PENDING_DELETE (both render as "awaiting review").
fn build_document_filter(
    params: &DocumentQuery,
) -> Result<(String, Vec<String>, u32), CoreError> {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<String> = Vec::new();

    if !params.include_deleted.unwrap_or(false) {
        conditions.push("NOT d.is_delete".to_string());
    }

    if let Some(ref title) = params.title {
        conditions.push(format!("d.title ILIKE ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(format!("%{title}%"));
    }

    if let Some(ref category) = params.category {
        conditions.push(format!("d.category = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(category.clone());
    }

    if let Some(ref scope) = params.visibility_scope {
        conditions.push(format!("d.visibility_scope = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(scope.clone());
    }

    if let Some(ref status) = params.status {
        let parsed: DocumentStatus = status
            .trim()
            .to_ascii_uppercase()
            .parse()
            .map_err(|_| CoreError::Validation(format!("Unknown status filter '{status}'")))?;
        let group: Vec<&'static str> = match parsed {
            DocumentStatus::Inactive => vec!["INACTIVE", "DELETED"],
            DocumentStatus::PendingApproval => vec!["PENDING_APPROVAL", "PENDING_DELETE"],
            other => vec![other.as_str()],
        };
        let placeholders: Vec<String> = group
            .into_iter()
            .map(|s| {
                let p = format!("${bind_idx}");
                bind_idx += 1;
                bind_values.push(s.to_string());
                p
            })
            .collect();
        conditions.push(format!("d.status IN ({})", placeholders.join(", ")));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    Ok((where_clause, bind_values, bind_idx))
}
