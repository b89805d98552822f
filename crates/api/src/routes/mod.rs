pub mod documents;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /documents                       list, create
/// /documents/{id}                  get, patch metadata, soft-delete
/// /documents/{id}/status           apply a lifecycle action (POST)
/// /documents/{id}/versions         list, submit (POST)
/// /documents/{id}/versions/{n}     single version (GET)
/// /documents/{id}/logs             action log (GET)
/// /documents/{id}/restore          clear the soft-delete flag (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/documents", documents::router())
}
