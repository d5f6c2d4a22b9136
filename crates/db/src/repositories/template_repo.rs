//! Repository for the `templates` table.

use sqlx::PgPool;

use slate_core::types::{DbId, Version};

use crate::models::template::{CreateTemplate, Template, UpdateTemplate};

const COLUMNS: &str =
    "id, name, description, design_data, version, is_active, created_at, updated_at";

/// Provides CRUD operations for templates, plus the version-guarded
/// design update used by the operations endpoint.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a new template, returning the created row.
    ///
    /// An omitted `design_data` starts the document as an empty object;
    /// the application layer seeds defaults on first read.
    pub async fn create(pool: &PgPool, input: &CreateTemplate) -> Result<Template, sqlx::Error> {
        let query = format!(
            "INSERT INTO templates (name, description, design_data) \
             VALUES ($1, $2, COALESCE($3, '{{}}'::jsonb)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.design_data)
            .fetch_one(pool)
            .await
    }

    /// Find a template by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = $1");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active templates, most recently updated first.
    pub async fn list(pool: &PgPool, limit: i32, offset: i32) -> Result<Vec<Template>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM templates \
             WHERE is_active = true \
             ORDER BY updated_at DESC \
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update template metadata. Only non-`None` fields are applied.
    /// Does not touch `design_data` or `version`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTemplate,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!(
            "UPDATE templates SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Replace the design document, guarded by a compare-and-swap on
    /// `version`. Returns `None` when the guard fails, either because the
    /// row is gone or because `base_version` is stale; the caller
    /// re-reads the row to tell the two apart.
    pub async fn update_design(
        pool: &PgPool,
        id: DbId,
        base_version: Version,
        design_data: &serde_json::Value,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!(
            "UPDATE templates SET \
                design_data = $3, \
                version = version + 1, \
                updated_at = NOW() \
             WHERE id = $1 AND version = $2 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(base_version)
            .bind(design_data)
            .fetch_optional(pool)
            .await?;
        if updated.is_none() {
            tracing::debug!(template_id = id, base_version, "design update guard missed");
        }
        Ok(updated)
    }

    /// Soft-deactivate a template (set is_active = false).
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE templates SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard-delete a template by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
