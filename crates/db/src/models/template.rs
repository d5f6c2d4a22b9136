//! Template models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use slate_core::types::{DbId, Timestamp};

/// A row from the `templates` table.
///
/// `design_data` is stored as opaque JSONB; the document schema lives in
/// `slate_core::design` and is only decoded when operations are applied.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Template {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub design_data: serde_json::Value,
    pub version: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new template.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplate {
    pub name: String,
    pub description: Option<String>,
    pub design_data: Option<serde_json::Value>,
}

/// DTO for updating template metadata. All fields are optional; the
/// design document itself only changes through the operations endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTemplate {
    pub name: Option<String>,
    pub description: Option<String>,
}
