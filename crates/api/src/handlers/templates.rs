//! Handlers for template CRUD.
//!
//! The design document itself is only written through the operations
//! endpoint (`handlers::operations`); these handlers manage the
//! surrounding resource: metadata, listing, lifecycle.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use slate_core::error::CoreError;
use slate_core::types::DbId;
use slate_db::models::template::{CreateTemplate, Template, UpdateTemplate};
use slate_db::repositories::TemplateRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Query parameters for listing templates.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify that a template exists, returning the full row.
pub(crate) async fn ensure_template_exists(
    pool: &sqlx::PgPool,
    id: DbId,
) -> AppResult<Template> {
    TemplateRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Template",
            id,
        })
    })
}

// ---------------------------------------------------------------------------
// GET /templates
// ---------------------------------------------------------------------------

/// List active templates, most recently updated first.
pub async fn list_templates(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let limit = params.limit.unwrap_or(50).clamp(1, 200);
    let offset = params.offset.unwrap_or(0).max(0);

    let items = TemplateRepo::list(&state.pool, limit, offset).await?;
    tracing::debug!(count = items.len(), "Listed templates");
    Ok(Json(DataResponse { data: items }))
}

// ---------------------------------------------------------------------------
// POST /templates
// ---------------------------------------------------------------------------

/// Create a new template.
pub async fn create_template(
    State(state): State<AppState>,
    Json(input): Json<CreateTemplate>,
) -> AppResult<impl IntoResponse> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Template name must not be empty".into(),
        )));
    }
    if let Some(design) = &input.design_data {
        if !design.is_object() {
            return Err(AppError::Core(CoreError::Validation(
                "design_data must be a JSON object".into(),
            )));
        }
    }

    let created = TemplateRepo::create(&state.pool, &input).await?;
    tracing::info!(template_id = created.id, "Created template");
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

// ---------------------------------------------------------------------------
// GET /templates/{id}
// ---------------------------------------------------------------------------

/// Fetch a template by ID, including its design document and version.
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = ensure_template_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: template }))
}

// ---------------------------------------------------------------------------
// PUT /templates/{id}
// ---------------------------------------------------------------------------

/// Update template metadata. Does not touch the design document or its
/// version.
pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTemplate>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        if name.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "Template name must not be empty".into(),
            )));
        }
    }

    let updated = TemplateRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Template",
            id,
        }))?;
    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// DELETE /templates/{id}
// ---------------------------------------------------------------------------

/// Soft-deactivate a template. The row is kept for recovery; it stops
/// appearing in listings.
pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let removed = TemplateRepo::deactivate(&state.pool, id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Template",
            id,
        }));
    }
    tracing::info!(template_id = id, "Deactivated template");
    Ok(StatusCode::NO_CONTENT)
}
