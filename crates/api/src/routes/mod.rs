pub mod health;
pub mod templates;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /templates                        list, create
/// /templates/{id}                   get, update, delete
/// /templates/{id}/operations        apply operation batch (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(templates::router())
}
