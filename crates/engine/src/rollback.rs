//! Rollback: move the live pointer back to a previously built deployment.

use serde_json::json;
use sqlx::PgPool;

use sdui_core::types::DbId;
use sdui_db::models::deployment::Deployment;
use sdui_db::models::deployment_log::{CreateDeploymentLog, LEVEL_INFO};
use sdui_db::repositories::{DeploymentLogRepo, DeploymentRepo};

use crate::error::EngineError;

/// Default number of rollback candidates returned when the caller does not
/// specify a limit.
pub const DEFAULT_CANDIDATE_LIMIT: i64 = 10;

/// Outcome of a rollback invocation. Like builds, rollbacks never surface
/// as `Err` to callers.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RollbackResult {
    pub success: bool,
    pub error: Option<String>,
}

/// Reverts the live pointer for a target to a prior deployment.
pub struct RollbackManager;

impl RollbackManager {
    /// Roll the target's live pointer back to `deployment_id`.
    ///
    /// The target is loaded scoped by `creator_id`, so a deployment owned
    /// by another tenant reads as missing. Only deployments that produced
    /// an artifact are eligible; `pending`, `building`, and `failed`
    /// attempts are rejected before any state changes.
    pub async fn rollback(
        pool: &PgPool,
        deployment_id: DbId,
        creator_id: DbId,
    ) -> RollbackResult {
        match Self::run(pool, deployment_id, creator_id).await {
            Ok(deployment) => {
                tracing::info!(
                    deployment_id,
                    creator_id,
                    version = deployment.version,
                    "Rolled back to deployment"
                );
                RollbackResult {
                    success: true,
                    error: None,
                }
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(deployment_id, creator_id, error = %message, "Rollback rejected");
                RollbackResult {
                    success: false,
                    error: Some(message),
                }
            }
        }
    }

    async fn run(
        pool: &PgPool,
        deployment_id: DbId,
        creator_id: DbId,
    ) -> Result<Deployment, EngineError> {
        let target = DeploymentRepo::find_for_creator(pool, deployment_id, creator_id)
            .await?
            .ok_or(EngineError::NotFound("Deployment"))?;

        if target.artifact_url.is_none() {
            return Err(EngineError::NoArtifact);
        }

        let promoted = DeploymentRepo::promote_rollback(
            pool,
            target.id,
            target.instance_id,
            &target.platform,
            creator_id,
        )
        .await?
        .ok_or(EngineError::Conflict)?;

        // The pointer move is committed; the audit entry is best-effort.
        let entry = CreateDeploymentLog {
            deployment_id: promoted.id,
            level: LEVEL_INFO.into(),
            message: format!("Rolled back to version {}", promoted.version),
            metadata: Some(json!({
                "version": promoted.version,
                "platform": promoted.platform,
            })),
        };
        if let Err(e) = DeploymentLogRepo::insert(pool, &entry).await {
            tracing::warn!(deployment_id = promoted.id, error = %e, "Failed to write rollback log entry");
        }

        Ok(promoted)
    }

    /// Deployments a caller may offer as rollback targets: everything past
    /// the in-flight states for the target, newest version first. `failed`
    /// rows appear here for history display but are rejected by
    /// [`Self::rollback`] since they have no artifact.
    pub async fn rollback_candidates(
        pool: &PgPool,
        instance_id: DbId,
        creator_id: DbId,
        platform: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Deployment>, sqlx::Error> {
        DeploymentRepo::list_rollback_candidates(
            pool,
            instance_id,
            creator_id,
            platform,
            limit.unwrap_or(DEFAULT_CANDIDATE_LIMIT),
        )
        .await
    }
}
