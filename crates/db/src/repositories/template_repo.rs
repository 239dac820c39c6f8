//! Repositories for the `templates` and `template_versions` tables.

use sdui_core::types::DbId;
use sqlx::PgPool;

use crate::models::template::{CreateTemplate, CreateTemplateVersion, Template, TemplateVersion};

/// Column list for `templates` SELECT queries.
const COLUMNS: &str = "id, name, description, owner_id, created_at, updated_at";

/// Column list for `template_versions` SELECT queries.
const VERSION_COLUMNS: &str = "id, template_id, version, template_json, created_at";

/// Provides operations for templates.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a new template, returning the created row.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateTemplate,
    ) -> Result<Template, sqlx::Error> {
        let query = format!(
            "INSERT INTO templates (name, description, owner_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(owner_id)
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
}

/// Provides operations for immutable template version snapshots.
///
/// There is deliberately no update method: a version's `template_json` is
/// frozen at creation, and template edits are published by cutting a new
/// version.
pub struct TemplateVersionRepo;

impl TemplateVersionRepo {
    /// Cut a new version of a template, allocating the next version number
    /// for that template in the same statement.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTemplateVersion,
    ) -> Result<TemplateVersion, sqlx::Error> {
        let query = format!(
            "INSERT INTO template_versions (template_id, version, template_json) \
             SELECT $1, COALESCE(MAX(version), 0) + 1, $2 \
             FROM template_versions WHERE template_id = $1 \
             RETURNING {VERSION_COLUMNS}"
        );
        sqlx::query_as::<_, TemplateVersion>(&query)
            .bind(input.template_id)
            .bind(&input.template_json)
            .fetch_one(pool)
            .await
    }

    /// Find a template version by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TemplateVersion>, sqlx::Error> {
        let query = format!("SELECT {VERSION_COLUMNS} FROM template_versions WHERE id = $1");
        sqlx::query_as::<_, TemplateVersion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all versions of a template, newest first.
    pub async fn list_for_template(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Vec<TemplateVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {VERSION_COLUMNS} FROM template_versions \
             WHERE template_id = $1 ORDER BY version DESC"
        );
        sqlx::query_as::<_, TemplateVersion>(&query)
            .bind(template_id)
            .fetch_all(pool)
            .await
    }
}
