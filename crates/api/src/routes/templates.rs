use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Mount template routes under `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/templates",
            get(handlers::templates::list_templates).post(handlers::templates::create_template),
        )
        .route(
            "/templates/{id}",
            get(handlers::templates::get_template)
                .put(handlers::templates::update_template)
                .delete(handlers::templates::delete_template),
        )
        .route(
            "/templates/{id}/operations",
            post(handlers::operations::apply_operations),
        )
}
