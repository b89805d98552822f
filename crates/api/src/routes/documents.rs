//! Route definitions for the `/documents` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::documents;
use crate::state::AppState;

/// Routes mounted at `/documents`.
///
/// ```text
/// GET    /                   -> list          (?title=&category=&status=...)
/// POST   /                   -> create
/// GET    /{id}               -> get_one
/// PATCH  /{id}               -> update_metadata
/// DELETE /{id}               -> soft_delete
/// POST   /{id}/status        -> change_status
/// GET    /{id}/versions      -> list_versions
/// POST   /{id}/versions      -> submit_version
/// GET    /{id}/versions/{n}  -> get_version
/// GET    /{id}/logs          -> list_logs
/// POST   /{id}/restore       -> restore
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(documents::list).post(documents::create))
        .route(
            "/{id}",
            get(documents::get_one)
                .patch(documents::update_metadata)
                .delete(documents::soft_delete),
        )
        .route("/{id}/status", post(documents::change_status))
        .route(
            "/{id}/versions",
            get(documents::list_versions).post(documents::submit_version),
        )
        .route("/{id}/versions/{version_no}", get(documents::get_version))
        .route("/{id}/logs", get(documents::list_logs))
        .route("/{id}/restore", post(documents::restore))
}
