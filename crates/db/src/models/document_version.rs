//! Document version entity model and DTOs.

use atrium_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `document_versions` table. Immutable once written.
///
/// For a fixed `document_id` the `version_no` values are unique, start at 1
/// and increase without gaps; numbers are assigned only inside the workflow
/// transaction and never reused.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentVersion {
    pub id: DbId,
    pub document_id: DbId,
    pub version_no: i32,
    pub file_ref: String,
    pub note: Option<String>,
    pub changed_at: Timestamp,
    pub created_by: Option<DbId>,
}

/// DTO for submitting a new version of an existing document.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitVersion {
    pub file_ref: String,
    pub note: Option<String>,
    pub created_by: Option<DbId>,
}
