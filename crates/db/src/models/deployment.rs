//! Deployment ledger models and DTOs.

use sdui_core::platform::Platform;
use sdui_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::StatusId;

/// A row from the `deployments` table: one build attempt/result for an
/// `(instance, platform)` target, owned by a single creator.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Deployment {
    pub id: DbId,
    pub instance_id: DbId,
    pub platform: String,
    pub creator_id: DbId,
    /// Monotonically increasing per `(instance_id, platform)`, allocated at
    /// row-creation time regardless of eventual build outcome.
    pub version: i32,
    pub status_id: StatusId,
    pub artifact_url: Option<String>,
    pub preview_url: Option<String>,
    pub resolved_json: Option<serde_json::Value>,
    pub build_duration_ms: Option<i64>,
    pub error_message: Option<String>,
    pub build_started_at: Option<Timestamp>,
    pub deployed_at: Option<Timestamp>,
    pub rolled_back_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for enqueueing a new deployment (inserted as `pending`). Taking
/// [`Platform`] rather than a free string makes an invalid target
/// unrepresentable at this boundary; the migration backs it with a CHECK
/// constraint for writes that bypass the repository.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDeployment {
    pub instance_id: DbId,
    pub platform: Platform,
}

/// Inputs for the atomic live promotion at the end of a successful build.
#[derive(Debug, Clone)]
pub struct PromoteLive {
    pub deployment_id: DbId,
    pub instance_id: DbId,
    pub platform: String,
    pub creator_id: DbId,
    pub artifact_url: String,
    pub preview_url: String,
    pub resolved_json: serde_json::Value,
    pub build_duration_ms: i64,
}

/// A row from the `live_deployments` pointer table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LiveDeployment {
    pub instance_id: DbId,
    pub platform: String,
    pub deployment_id: DbId,
    pub updated_at: Timestamp,
}
