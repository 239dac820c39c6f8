//! Repository for the `template_instances` table.
//!
//! All reads and writes are creator-scoped: a tenant can only ever see or
//! touch its own instances because the `creator_id` predicate is part of
//! every query.

use sdui_core::types::DbId;
use sqlx::PgPool;

use crate::models::template_instance::{
    CreateTemplateInstance, TemplateInstance, UpdateTemplateInstance,
};

const COLUMNS: &str = "\
    id, template_version_id, creator_id, name, theme_overrides, \
    section_overrides, content_bindings, created_at, updated_at";

/// Provides creator-scoped CRUD operations for template instances.
pub struct TemplateInstanceRepo;

impl TemplateInstanceRepo {
    /// Insert a new instance for a creator, returning the created row.
    pub async fn create(
        pool: &PgPool,
        creator_id: DbId,
        input: &CreateTemplateInstance,
    ) -> Result<TemplateInstance, sqlx::Error> {
        let query = format!(
            "INSERT INTO template_instances \
                (template_version_id, creator_id, name, theme_overrides, \
                 section_overrides, content_bindings) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TemplateInstance>(&query)
            .bind(input.template_version_id)
            .bind(creator_id)
            .bind(&input.name)
            .bind(&input.theme_overrides)
            .bind(&input.section_overrides)
            .bind(&input.content_bindings)
            .fetch_one(pool)
            .await
    }

    /// Find an instance by ID, scoped to its owning creator.
    pub async fn find_for_creator(
        pool: &PgPool,
        id: DbId,
        creator_id: DbId,
    ) -> Result<Option<TemplateInstance>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM template_instances WHERE id = $1 AND creator_id = $2");
        sqlx::query_as::<_, TemplateInstance>(&query)
            .bind(id)
            .bind(creator_id)
            .fetch_optional(pool)
            .await
    }

    /// Update an instance. Only non-`None` fields are applied. Changes take
    /// effect on the next build, never retroactively on past deployments.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        creator_id: DbId,
        input: &UpdateTemplateInstance,
    ) -> Result<Option<TemplateInstance>, sqlx::Error> {
        let query = format!(
            "UPDATE template_instances SET \
                name = COALESCE($3, name), \
                theme_overrides = COALESCE($4, theme_overrides), \
                section_overrides = COALESCE($5, section_overrides), \
                content_bindings = COALESCE($6, content_bindings), \
                updated_at = NOW() \
             WHERE id = $1 AND creator_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TemplateInstance>(&query)
            .bind(id)
            .bind(creator_id)
            .bind(&input.name)
            .bind(&input.theme_overrides)
            .bind(&input.section_overrides)
            .bind(&input.content_bindings)
            .fetch_optional(pool)
            .await
    }

    /// List a creator's instances, newest first.
    pub async fn list_for_creator(
        pool: &PgPool,
        creator_id: DbId,
    ) -> Result<Vec<TemplateInstance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM template_instances \
             WHERE creator_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, TemplateInstance>(&query)
            .bind(creator_id)
            .fetch_all(pool)
            .await
    }
}
