//! Deployment log models. Append-only from this subsystem's perspective;
//! an external observability surface consumes the entries.

use sdui_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Info-level log entry (normal pipeline progress).
pub const LEVEL_INFO: &str = "info";

/// Error-level log entry (terminal pipeline failure).
pub const LEVEL_ERROR: &str = "error";

/// A row from the `deployment_logs` table. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeploymentLog {
    pub id: DbId,
    pub deployment_id: DbId,
    pub level: String,
    pub message: String,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// DTO for appending a log entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDeploymentLog {
    pub deployment_id: DbId,
    pub level: String,
    pub message: String,
    pub metadata: Option<serde_json::Value>,
}
