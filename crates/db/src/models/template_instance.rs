//! Template instance model and DTOs.
//!
//! An instance is a creator's configured use of a template version. It is
//! mutable, but edits only affect the next build; past deployments keep the
//! `resolved_json` snapshot taken when they were built.

use sdui_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `template_instances` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TemplateInstance {
    pub id: DbId,
    pub template_version_id: DbId,
    pub creator_id: DbId,
    pub name: String,
    /// Wholesale replacement for the template's `themeOverrides`.
    pub theme_overrides: Option<serde_json::Value>,
    /// JSON object mapping section id to a prop patch object.
    pub section_overrides: Option<serde_json::Value>,
    /// JSON array of `ContentBinding` objects (camelCase keys).
    pub content_bindings: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new instance.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplateInstance {
    pub template_version_id: DbId,
    pub name: String,
    pub theme_overrides: Option<serde_json::Value>,
    pub section_overrides: Option<serde_json::Value>,
    pub content_bindings: Option<serde_json::Value>,
}

/// DTO for updating an instance. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTemplateInstance {
    pub name: Option<String>,
    pub theme_overrides: Option<serde_json::Value>,
    pub section_overrides: Option<serde_json::Value>,
    pub content_bindings: Option<serde_json::Value>,
}
