use crate::types::{DbId, Version};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Version conflict: document is at version {current}, request was based on version {requested}")]
    VersionConflict { current: Version, requested: Version },

    #[error("Internal error: {0}")]
    Internal(String),
}
