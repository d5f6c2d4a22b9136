//! Handler for the operation-batch endpoint.
//!
//! `POST /templates/{id}/operations` is the only write path for design
//! documents. A batch is applied all-or-nothing against the stored
//! document, guarded by optimistic concurrency:
//!
//! 1. The client's `baseVersion` must match the stored version, otherwise
//!    409 `VERSION_CONFLICT` with both versions and nothing applied.
//! 2. Every operation in the batch must apply cleanly, otherwise 400
//!    `OPERATION_FAILED` and nothing persisted.
//! 3. The write itself is a compare-and-swap on the version column, so a
//!    concurrent writer landing between read and write surfaces as a
//!    conflict rather than a lost update.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use slate_core::design::DesignData;
use slate_core::error::CoreError;
use slate_core::executor::apply_operations as apply_to_design;
use slate_core::operation::Operation;
use slate_core::types::{DbId, Version};
use slate_core::version::check_base_version;
use slate_db::models::template::Template;
use slate_db::repositories::TemplateRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::templates::ensure_template_exists;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

/// Request body for `POST /templates/{id}/operations`.
///
/// Deserializing `operations` already validates each entry: unknown
/// operation types and malformed payloads are rejected by serde before
/// the handler runs.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOperationsRequest {
    #[validate(length(min = 1, max = 500, message = "batch must contain 1 to 500 operations"))]
    pub operations: Vec<Operation>,
    pub base_version: Version,
}

/// Response body: the updated template row plus the IDs of the applied
/// operations, in application order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOperationsResponse {
    pub template: Template,
    pub applied_ops: Vec<String>,
}

// ---------------------------------------------------------------------------
// POST /templates/{id}/operations
// ---------------------------------------------------------------------------

pub async fn apply_operations(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(payload): Json<ApplyOperationsRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let template = ensure_template_exists(&state.pool, id).await?;
    check_base_version(template.version, payload.base_version)?;

    // A stored document predating any operations may be `{}`; defaults
    // fill in the canvas and empty collections.
    let design: DesignData = serde_json::from_value(template.design_data)
        .map_err(|e| AppError::InternalError(format!("stored design data is corrupt: {e}")))?;

    let next = apply_to_design(&design, &payload.operations).map_err(|e| {
        tracing::warn!(template_id = id, error = %e, "Rejected operation batch");
        AppError::OperationFailed {
            message: "One or more operations could not be applied".into(),
            details: e.to_string(),
        }
    })?;

    let next_json = serde_json::to_value(&next)
        .map_err(|e| AppError::InternalError(format!("failed to encode design data: {e}")))?;

    let updated = TemplateRepo::update_design(&state.pool, id, payload.base_version, &next_json)
        .await?;

    let updated = match updated {
        Some(row) => row,
        // The guard missed: either a concurrent writer bumped the version
        // since our read, or the row is gone. Re-read to tell them apart.
        None => {
            return Err(match TemplateRepo::find_by_id(&state.pool, id).await? {
                Some(current) => AppError::Core(CoreError::VersionConflict {
                    current: current.version,
                    requested: payload.base_version,
                }),
                None => AppError::Core(CoreError::NotFound {
                    entity: "Template",
                    id,
                }),
            });
        }
    };

    let applied_ops: Vec<String> = payload.operations.iter().map(|op| op.id.clone()).collect();
    tracing::info!(
        template_id = id,
        count = applied_ops.len(),
        version = updated.version,
        "Applied operation batch"
    );

    Ok(Json(ApplyOperationsResponse {
        template: updated,
        applied_ops,
    }))
}
