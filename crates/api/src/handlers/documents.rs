//! Handlers for the `/documents` resource.
//!
//! Thin HTTP adapters over [`DocumentWorkflow`]: extract the tenant and the
//! request payload, call the workflow, and map the result to JSON. No
//! lifecycle rules live here.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use atrium_core::document::DocumentAction;
use atrium_core::types::DbId;
use atrium_db::models::document::{CreateDocument, Document, DocumentPage, DocumentQuery, UpdateDocumentMeta};
use atrium_db::models::document_action_log::DocumentActionLog;
use atrium_db::models::document_version::{DocumentVersion, SubmitVersion};
use atrium_db::repositories::DocumentRepo;
use atrium_db::DocumentWorkflow;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::tenant::RequestTenant;

/// Response payload for document creation: the new document together with
/// its first version.
#[derive(Debug, Serialize)]
pub struct CreatedDocument {
    pub document: Document,
    pub version: DocumentVersion,
}

/// Request payload for a status-change action.
#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    /// Action name, e.g. "APPROVE" or "REQUEST_DELETE".
    pub action: String,
    pub actor_id: Option<DbId>,
    /// Free-text detail recorded in the action log (e.g. a rejection reason).
    pub detail: Option<String>,
}

/// Query parameters for soft-delete and restore.
#[derive(Debug, Deserialize)]
pub struct ActorQuery {
    pub actor_id: Option<DbId>,
    pub reason: Option<String>,
}

/// POST /api/v1/documents
///
/// Create a document with its first version. Starts in PENDING_APPROVAL.
pub async fn create(
    State(state): State<AppState>,
    RequestTenant(tenant): RequestTenant,
    Json(input): Json<CreateDocument>,
) -> AppResult<(StatusCode, Json<CreatedDocument>)> {
    let (document, version) = DocumentWorkflow::create(&state.pool, &tenant, &input).await?;
    Ok((StatusCode::CREATED, Json(CreatedDocument { document, version })))
}

/// GET /api/v1/documents
///
/// Filtered, paginated document listing joined with the display version.
pub async fn list(
    State(state): State<AppState>,
    RequestTenant(tenant): RequestTenant,
    Query(params): Query<DocumentQuery>,
) -> AppResult<Json<DocumentPage>> {
    let page = DocumentRepo::search(&state.pool, &tenant, &params).await?;
    Ok(Json(page))
}

/// GET /api/v1/documents/{id}
pub async fn get_one(
    State(state): State<AppState>,
    RequestTenant(tenant): RequestTenant,
    Path(id): Path<DbId>,
) -> AppResult<Json<Document>> {
    let document = DocumentWorkflow::get(&state.pool, &tenant, id).await?;
    Ok(Json(document))
}

/// PATCH /api/v1/documents/{id}
///
/// Edit metadata of an ACTIVE document; a real change re-enters approval.
pub async fn update_metadata(
    State(state): State<AppState>,
    RequestTenant(tenant): RequestTenant,
    Path(id): Path<DbId>,
    Query(actor): Query<ActorQuery>,
    Json(input): Json<UpdateDocumentMeta>,
) -> AppResult<Json<Document>> {
    let document =
        DocumentWorkflow::update_metadata(&state.pool, &tenant, id, &input, actor.actor_id).await?;
    Ok(Json(document))
}

/// POST /api/v1/documents/{id}/status
///
/// Apply a named status-change action (APPROVE, REJECT, DEACTIVATE,
/// REQUEST_DELETE, APPROVE_DELETE, REJECT_DELETE, REQUEST_REACTIVATE).
pub async fn change_status(
    State(state): State<AppState>,
    RequestTenant(tenant): RequestTenant,
    Path(id): Path<DbId>,
    Json(input): Json<ChangeStatusRequest>,
) -> AppResult<Json<Document>> {
    let action: DocumentAction = input
        .action
        .trim()
        .to_ascii_uppercase()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Unknown action '{}'", input.action)))?;

    let document = DocumentWorkflow::change_status(
        &state.pool,
        &tenant,
        id,
        action,
        input.actor_id,
        input.detail.as_deref(),
    )
    .await?;
    Ok(Json(document))
}

/// POST /api/v1/documents/{id}/versions
///
/// Submit a new file version of an ACTIVE document.
pub async fn submit_version(
    State(state): State<AppState>,
    RequestTenant(tenant): RequestTenant,
    Path(id): Path<DbId>,
    Json(input): Json<SubmitVersion>,
) -> AppResult<(StatusCode, Json<DocumentVersion>)> {
    let version =
        DocumentWorkflow::submit_version(&state.pool, &tenant, id, &input, input.created_by)
            .await?;
    Ok((StatusCode::CREATED, Json(version)))
}

/// GET /api/v1/documents/{id}/versions/{version_no}
pub async fn get_version(
    State(state): State<AppState>,
    RequestTenant(tenant): RequestTenant,
    Path((id, version_no)): Path<(DbId, i32)>,
) -> AppResult<Json<DocumentVersion>> {
    let version = DocumentWorkflow::version(&state.pool, &tenant, id, version_no).await?;
    Ok(Json(version))
}

/// GET /api/v1/documents/{id}/versions
pub async fn list_versions(
    State(state): State<AppState>,
    RequestTenant(tenant): RequestTenant,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<DocumentVersion>>> {
    let versions = DocumentWorkflow::versions(&state.pool, &tenant, id).await?;
    Ok(Json(versions))
}

/// GET /api/v1/documents/{id}/logs
pub async fn list_logs(
    State(state): State<AppState>,
    RequestTenant(tenant): RequestTenant,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<DocumentActionLog>>> {
    let logs = DocumentWorkflow::logs(&state.pool, &tenant, id).await?;
    Ok(Json(logs))
}

/// DELETE /api/v1/documents/{id}
///
/// Soft-delete an INACTIVE document (flags it, keeps the row).
pub async fn soft_delete(
    State(state): State<AppState>,
    RequestTenant(tenant): RequestTenant,
    Path(id): Path<DbId>,
    Query(actor): Query<ActorQuery>,
) -> AppResult<Json<Document>> {
    let document = DocumentWorkflow::soft_delete(
        &state.pool,
        &tenant,
        id,
        actor.actor_id,
        actor.reason.as_deref(),
    )
    .await?;
    Ok(Json(document))
}

/// POST /api/v1/documents/{id}/restore
///
/// Clear the soft-delete flag.
pub async fn restore(
    State(state): State<AppState>,
    RequestTenant(tenant): RequestTenant,
    Path(id): Path<DbId>,
    Query(actor): Query<ActorQuery>,
) -> AppResult<Json<Document>> {
    let document = DocumentWorkflow::restore(
        &state.pool,
        &tenant,
        id,
        actor.actor_id,
        actor.reason.as_deref(),
    )
    .await?;
    Ok(Json(document))
}
