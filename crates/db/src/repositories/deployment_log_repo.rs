//! Repository for the append-only `deployment_logs` table.

use sdui_core::types::DbId;
use sqlx::PgPool;

use crate::models::deployment_log::{CreateDeploymentLog, DeploymentLog};

const COLUMNS: &str = "id, deployment_id, level, message, metadata, created_at";

/// Provides insert and read-back operations for deployment logs. There are
/// no update or delete methods; entries are immutable once written.
pub struct DeploymentLogRepo;

impl DeploymentLogRepo {
    /// Append a log entry.
    pub async fn insert(
        pool: &PgPool,
        input: &CreateDeploymentLog,
    ) -> Result<DeploymentLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO deployment_logs (deployment_id, level, message, metadata) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DeploymentLog>(&query)
            .bind(input.deployment_id)
            .bind(&input.level)
            .bind(&input.message)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }

    /// List a deployment's log entries in write order.
    pub async fn list_for_deployment(
        pool: &PgPool,
        deployment_id: DbId,
        limit: i64,
    ) -> Result<Vec<DeploymentLog>, sqlx::Error> {
        let limit = limit.clamp(1, 500);
        let query = format!(
            "SELECT {COLUMNS} FROM deployment_logs \
             WHERE deployment_id = $1 ORDER BY id ASC LIMIT $2"
        );
        sqlx::query_as::<_, DeploymentLog>(&query)
            .bind(deployment_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
