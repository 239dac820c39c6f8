//! Template and template version models and DTOs.

use sdui_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Template {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new template.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplate {
    pub name: String,
    pub description: Option<String>,
}

/// A row from the `template_versions` table. Immutable once created: the
/// repository exposes no update method and the table has no `updated_at`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TemplateVersion {
    pub id: DbId,
    pub template_id: DbId,
    pub version: i32,
    pub template_json: serde_json::Value,
    pub created_at: Timestamp,
}

/// DTO for cutting a new template version. The version number itself is
/// allocated by the repository (next per template).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplateVersion {
    pub template_id: DbId,
    pub template_json: serde_json::Value,
}
