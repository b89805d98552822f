//! Document entity model and DTOs.

use atrium_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `documents` table.
///
/// `status` and `current_version` are mutated only by the workflow's state
/// machine; `is_delete` is the soft-delete flag, orthogonal to `status`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub category: String,
    pub title: String,
    pub visibility_scope: Option<String>,
    pub status: String,
    pub current_version: Option<i32>,
    pub is_delete: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new document together with its first version.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDocument {
    pub category: String,
    pub title: String,
    pub visibility_scope: Option<String>,
    /// Opaque reference into the external blob store.
    pub file_ref: String,
    pub note: Option<String>,
    pub created_by: Option<DbId>,
}

/// DTO for editing document metadata. All fields optional; omitted fields
/// are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDocumentMeta {
    pub title: Option<String>,
    pub category: Option<String>,
    pub visibility_scope: Option<String>,
}

/// Filter parameters for the document listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentQuery {
    /// Case-insensitive title substring.
    pub title: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub visibility_scope: Option<String>,
    /// Include rows flagged `is_delete` (admin listings only).
    pub include_deleted: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A listing row: the document joined with its display version.
///
/// The display version is the current version when one has been approved,
/// otherwise the latest submitted version.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentListing {
    pub id: DbId,
    pub category: String,
    pub title: String,
    pub visibility_scope: Option<String>,
    pub status: String,
    pub current_version: Option<i32>,
    pub is_delete: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub latest_version_no: i32,
    pub file_ref: String,
    pub version_note: Option<String>,
    pub changed_at: Timestamp,
}

/// Paginated response for document listings.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentPage {
    pub items: Vec<DocumentListing>,
    pub total: i64,
}
