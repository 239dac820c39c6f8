//! The build pipeline: load inputs, resolve, persist artifacts, move the
//! live pointer.
//!
//! Ordering is the pipeline's core safety property: both artifacts are
//! durably stored before any other deployment for the target loses `live`
//! status. A build that fails at any step leaves whatever was live before
//! the call serving, untouched.

use std::time::Instant;

use serde_json::{json, Value};
use sqlx::PgPool;

use sdui_core::artifact::{preview_key, screen_key};
use sdui_core::error::CoreError;
use sdui_core::resolver::{self, ContentBinding};
use sdui_core::types::DbId;
use sdui_db::models::deployment::{Deployment, PromoteLive};
use sdui_db::models::deployment_log::{CreateDeploymentLog, LEVEL_ERROR, LEVEL_INFO};
use sdui_db::models::template_instance::TemplateInstance;
use sdui_db::repositories::{
    DeploymentLogRepo, DeploymentRepo, TemplateInstanceRepo, TemplateVersionRepo,
};
use sdui_storage::ArtifactStore;

use crate::error::EngineError;

/// Outcome of a build invocation. `build` never returns `Err`: failures are
/// captured here and persisted on the deployment row.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuildResult {
    pub success: bool,
    pub artifact_url: Option<String>,
    pub preview_url: Option<String>,
    pub error: Option<String>,
    pub duration_ms: i64,
}

/// Drives the end-to-end build pipeline for one deployment.
pub struct Orchestrator;

impl Orchestrator {
    /// Build a deployment and make it live.
    ///
    /// All ledger access is scoped by `creator_id`; a deployment owned by
    /// another tenant fails with "Deployment not found".
    pub async fn build(
        pool: &PgPool,
        store: &ArtifactStore,
        deployment_id: DbId,
        creator_id: DbId,
    ) -> BuildResult {
        let started = Instant::now();

        match Self::claim(pool, deployment_id, creator_id).await {
            Ok(deployment) => Self::run(pool, store, deployment, started).await,
            Err(e) => Self::fail(pool, deployment_id, creator_id, e, elapsed_ms(started)).await,
        }
    }

    /// Build a deployment a worker has already claimed (already `building`,
    /// via `DeploymentRepo::claim_next_pending`). Skips the claim step and
    /// runs the rest of the pipeline.
    pub async fn build_claimed(
        pool: &PgPool,
        store: &ArtifactStore,
        deployment: Deployment,
    ) -> BuildResult {
        Self::run(pool, store, deployment, Instant::now()).await
    }

    /// Claim a pending deployment for this build attempt.
    async fn claim(
        pool: &PgPool,
        deployment_id: DbId,
        creator_id: DbId,
    ) -> Result<Deployment, EngineError> {
        let deployment = DeploymentRepo::find_for_creator(pool, deployment_id, creator_id)
            .await?
            .ok_or(EngineError::NotFound("Deployment"))?;

        // Status gate: only a pending deployment can start building, so the
        // same deployment is never built twice.
        DeploymentRepo::mark_building(pool, deployment.id, creator_id)
            .await?
            .ok_or(EngineError::Conflict)
    }

    async fn run(
        pool: &PgPool,
        store: &ArtifactStore,
        deployment: Deployment,
        started: Instant,
    ) -> BuildResult {
        let deployment_id = deployment.id;
        let creator_id = deployment.creator_id;

        match Self::run_pipeline(pool, store, deployment, started).await {
            Ok(deployment) => {
                let duration_ms = elapsed_ms(started);
                tracing::info!(
                    deployment_id,
                    creator_id,
                    version = deployment.version,
                    duration_ms,
                    "Deployment built and live"
                );
                BuildResult {
                    success: true,
                    artifact_url: deployment.artifact_url,
                    preview_url: deployment.preview_url,
                    error: None,
                    duration_ms,
                }
            }
            Err(e) => Self::fail(pool, deployment_id, creator_id, e, elapsed_ms(started)).await,
        }
    }

    /// The pipeline proper. `deployment` must already be in `building`.
    async fn run_pipeline(
        pool: &PgPool,
        store: &ArtifactStore,
        deployment: Deployment,
        started: Instant,
    ) -> Result<Deployment, EngineError> {
        let creator_id = deployment.creator_id;

        log_info(
            pool,
            deployment.id,
            "Build started",
            json!({ "platform": deployment.platform, "version": deployment.version }),
        )
        .await?;

        let instance =
            TemplateInstanceRepo::find_for_creator(pool, deployment.instance_id, creator_id)
                .await?
                .ok_or(EngineError::NotFound("Template instance"))?;

        let template_version = TemplateVersionRepo::find_by_id(pool, instance.template_version_id)
            .await?
            .ok_or(EngineError::NotFound("Template version"))?;

        let resolved = resolve_instance(&template_version.template_json, &instance)?;
        log_info(
            pool,
            deployment.id,
            "Template resolved",
            json!({ "templateVersionId": template_version.id }),
        )
        .await?;

        // Screen first, then preview. Both must be durable before the live
        // pointer moves.
        let artifact_url = store
            .upload_document(
                &screen_key(creator_id, deployment.id),
                &resolved,
            )
            .await?;

        let preview = preview_document(&resolved, deployment.id);
        let preview_url = store
            .upload_document(&preview_key(creator_id, deployment.id), &preview)
            .await?;

        log_info(
            pool,
            deployment.id,
            "Artifacts uploaded",
            json!({ "artifactUrl": artifact_url, "previewUrl": preview_url }),
        )
        .await?;

        let promoted = DeploymentRepo::promote_live(
            pool,
            &PromoteLive {
                deployment_id: deployment.id,
                instance_id: deployment.instance_id,
                platform: deployment.platform.clone(),
                creator_id,
                artifact_url,
                preview_url,
                resolved_json: resolved,
                build_duration_ms: elapsed_ms(started),
            },
        )
        .await?
        .ok_or(EngineError::Conflict)?;

        // The transition is committed; a failed audit write must not turn a
        // live deployment into a reported failure.
        let entry = CreateDeploymentLog {
            deployment_id: promoted.id,
            level: LEVEL_INFO.into(),
            message: "Deployment live".into(),
            metadata: Some(json!({ "version": promoted.version })),
        };
        if let Err(e) = DeploymentLogRepo::insert(pool, &entry).await {
            tracing::warn!(deployment_id = promoted.id, error = %e, "Failed to write live log entry");
        }

        Ok(promoted)
    }

    /// Failure path: persist status, message, and duration; append an
    /// error-level log entry; return a structured failure.
    ///
    /// A conflict means another transition owns the row right now, so no
    /// ledger writes happen for it. For everything else, `mark_failed` is
    /// gated on `building`; the error log entry is written only when that
    /// gate applied, keeping ledger writes scoped to rows this build
    /// actually claimed.
    async fn fail(
        pool: &PgPool,
        deployment_id: DbId,
        creator_id: DbId,
        error: EngineError,
        duration_ms: i64,
    ) -> BuildResult {
        let message = error.to_string();
        tracing::error!(deployment_id, creator_id, error = %message, duration_ms, "Build failed");

        if !matches!(error, EngineError::Conflict) {
            match DeploymentRepo::mark_failed(pool, deployment_id, creator_id, &message, duration_ms)
                .await
            {
                Ok(Some(_)) => {
                    let entry = CreateDeploymentLog {
                        deployment_id,
                        level: LEVEL_ERROR.into(),
                        message: format!("Build failed: {message}"),
                        metadata: None,
                    };
                    if let Err(e) = DeploymentLogRepo::insert(pool, &entry).await {
                        tracing::warn!(deployment_id, error = %e, "Failed to write failure log entry");
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(deployment_id, error = %e, "Failed to record build failure");
                }
            }
        }

        BuildResult {
            success: false,
            artifact_url: None,
            preview_url: None,
            error: Some(message),
            duration_ms,
        }
    }
}

/// Resolve an instance against its template document.
fn resolve_instance(
    template_json: &Value,
    instance: &TemplateInstance,
) -> Result<Value, EngineError> {
    let section_overrides = instance
        .section_overrides
        .as_ref()
        .and_then(Value::as_object);

    let bindings: Option<Vec<ContentBinding>> = instance
        .content_bindings
        .as_ref()
        .map(|value| {
            serde_json::from_value(value.clone()).map_err(|e| {
                CoreError::Validation(format!("Malformed content bindings: {e}"))
            })
        })
        .transpose()?;

    Ok(resolver::resolve(
        template_json,
        instance.theme_overrides.as_ref(),
        section_overrides,
        bindings.as_deref(),
    ))
}

/// The preview artifact is the resolved document plus two debug fields.
/// It is for draft/QA viewing and is never the canonical live artifact.
fn preview_document(resolved: &Value, deployment_id: DbId) -> Value {
    let mut preview = resolved.clone();
    if let Some(obj) = preview.as_object_mut() {
        obj.insert("_preview".into(), Value::Bool(true));
        obj.insert("_deploymentId".into(), json!(deployment_id));
    }
    preview
}

async fn log_info(
    pool: &PgPool,
    deployment_id: DbId,
    message: &str,
    metadata: Value,
) -> Result<(), sqlx::Error> {
    DeploymentLogRepo::insert(
        pool,
        &CreateDeploymentLog {
            deployment_id,
            level: LEVEL_INFO.into(),
            message: message.into(),
            metadata: Some(metadata),
        },
    )
    .await?;
    Ok(())
}

fn elapsed_ms(started: Instant) -> i64 {
    i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preview_document_adds_debug_fields_only() {
        let resolved = json!({ "sections": [], "_version": "1.0" });
        let preview = preview_document(&resolved, 42);
        assert_eq!(preview["_preview"], json!(true));
        assert_eq!(preview["_deploymentId"], json!(42));
        assert_eq!(preview["sections"], json!([]));
        // The canonical document is untouched.
        assert!(resolved.get("_preview").is_none());
    }
}
