//! Repository for the `deployments` ledger and the `live_deployments`
//! pointer table.
//!
//! The live pointer is the single source of truth for "what is serving" per
//! `(instance_id, platform)` target. Both promotion paths (successful build
//! and rollback) run as one transaction that locks the pointer row first,
//! then demotes whatever was live, then promotes the subject row through a
//! status-gated UPDATE. Two concurrent promotions for the same target
//! therefore serialize on the pointer row, and a promotion whose gate no
//! longer holds rolls the whole transaction back and reports a conflict via
//! `Ok(None)`.

use sdui_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::deployment::{CreateDeployment, Deployment, LiveDeployment, PromoteLive};
use crate::models::status::DeploymentStatus;

const COLUMNS: &str = "\
    id, instance_id, platform, creator_id, version, status_id, \
    artifact_url, preview_url, resolved_json, build_duration_ms, \
    error_message, build_started_at, deployed_at, rolled_back_at, created_at";

/// Provides ledger operations for deployments.
pub struct DeploymentRepo;

impl DeploymentRepo {
    /// Enqueue a new deployment in `pending`, allocating the next version
    /// number for its `(instance_id, platform)` target in the same
    /// statement. Version numbers are permanent: a failed build keeps its
    /// version and a retry gets a fresh row with a fresh version.
    pub async fn create(
        pool: &PgPool,
        creator_id: DbId,
        input: &CreateDeployment,
    ) -> Result<Deployment, sqlx::Error> {
        let query = format!(
            "INSERT INTO deployments (instance_id, platform, creator_id, version, status_id) \
             SELECT $1, $2, $3, COALESCE(MAX(version), 0) + 1, $4 \
             FROM deployments WHERE instance_id = $1 AND platform = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deployment>(&query)
            .bind(input.instance_id)
            .bind(input.platform.name())
            .bind(creator_id)
            .bind(DeploymentStatus::Pending.id())
            .fetch_one(pool)
            .await
    }

    /// Find a deployment by ID (unscoped; internal use).
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Deployment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM deployments WHERE id = $1");
        sqlx::query_as::<_, Deployment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a deployment by ID, scoped to its owning creator. A deployment
    /// owned by another tenant is indistinguishable from a missing one.
    pub async fn find_for_creator(
        pool: &PgPool,
        id: DbId,
        creator_id: DbId,
    ) -> Result<Option<Deployment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM deployments WHERE id = $1 AND creator_id = $2");
        sqlx::query_as::<_, Deployment>(&query)
            .bind(id)
            .bind(creator_id)
            .fetch_optional(pool)
            .await
    }

    /// Transition `pending -> building`, stamping `build_started_at`.
    ///
    /// The UPDATE is gated on the current status, so the same deployment can
    /// never be built twice: the second caller gets `Ok(None)`.
    pub async fn mark_building(
        pool: &PgPool,
        id: DbId,
        creator_id: DbId,
    ) -> Result<Option<Deployment>, sqlx::Error> {
        let query = format!(
            "UPDATE deployments \
             SET status_id = $3, build_started_at = NOW() \
             WHERE id = $1 AND creator_id = $2 AND status_id = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deployment>(&query)
            .bind(id)
            .bind(creator_id)
            .bind(DeploymentStatus::Building.id())
            .bind(DeploymentStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Record a terminal build failure: status, error message, duration.
    ///
    /// Gated on `building` and creator-scoped, so a failed build attempt can
    /// only ever fail its own in-flight row. It can never demote a row that
    /// is live, already terminal, or owned by another tenant.
    pub async fn mark_failed(
        pool: &PgPool,
        id: DbId,
        creator_id: DbId,
        error_message: &str,
        build_duration_ms: i64,
    ) -> Result<Option<Deployment>, sqlx::Error> {
        let query = format!(
            "UPDATE deployments \
             SET status_id = $3, error_message = $4, build_duration_ms = $5 \
             WHERE id = $1 AND creator_id = $2 AND status_id = $6 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deployment>(&query)
            .bind(id)
            .bind(creator_id)
            .bind(DeploymentStatus::Failed.id())
            .bind(error_message)
            .bind(build_duration_ms)
            .bind(DeploymentStatus::Building.id())
            .fetch_optional(pool)
            .await
    }

    /// Atomically move the live pointer to a freshly built deployment.
    ///
    /// One transaction: lock/upsert the pointer row for the target, demote
    /// every other live deployment for that target to `rolled_back`, then
    /// promote the subject row gated on `status = building` and the owning
    /// creator. `Ok(None)` means the gate failed (a concurrent transition
    /// won, or the caller does not own the row); nothing is changed in that
    /// case.
    pub async fn promote_live(
        pool: &PgPool,
        input: &PromoteLive,
    ) -> Result<Option<Deployment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        Self::move_pointer(&mut tx, input.instance_id, &input.platform, input.deployment_id)
            .await?;
        Self::demote_live(
            &mut tx,
            input.instance_id,
            &input.platform,
            input.creator_id,
            input.deployment_id,
        )
        .await?;

        let query = format!(
            "UPDATE deployments \
             SET status_id = $2, artifact_url = $3, preview_url = $4, \
                 resolved_json = $5, build_duration_ms = $6, \
                 deployed_at = NOW(), rolled_back_at = NULL, error_message = NULL \
             WHERE id = $1 AND creator_id = $8 AND status_id = $7 \
             RETURNING {COLUMNS}"
        );
        let promoted = sqlx::query_as::<_, Deployment>(&query)
            .bind(input.deployment_id)
            .bind(DeploymentStatus::Live.id())
            .bind(&input.artifact_url)
            .bind(&input.preview_url)
            .bind(&input.resolved_json)
            .bind(input.build_duration_ms)
            .bind(DeploymentStatus::Building.id())
            .bind(input.creator_id)
            .fetch_optional(&mut *tx)
            .await?;

        match promoted {
            Some(deployment) => {
                tx.commit().await?;
                Ok(Some(deployment))
            }
            None => {
                tx.rollback().await?;
                Ok(None)
            }
        }
    }

    /// Atomically move the live pointer back to a previously built
    /// deployment.
    ///
    /// Same transaction shape as [`Self::promote_live`], but the promotion
    /// gate requires a non-null `artifact_url` (an unbuilt deployment can
    /// never be made live) and re-applies the creator scope.
    pub async fn promote_rollback(
        pool: &PgPool,
        deployment_id: DbId,
        instance_id: DbId,
        platform: &str,
        creator_id: DbId,
    ) -> Result<Option<Deployment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        Self::move_pointer(&mut tx, instance_id, platform, deployment_id).await?;
        Self::demote_live(&mut tx, instance_id, platform, creator_id, deployment_id).await?;

        let query = format!(
            "UPDATE deployments \
             SET status_id = $3, deployed_at = NOW(), rolled_back_at = NULL \
             WHERE id = $1 AND creator_id = $2 AND artifact_url IS NOT NULL \
             RETURNING {COLUMNS}"
        );
        let promoted = sqlx::query_as::<_, Deployment>(&query)
            .bind(deployment_id)
            .bind(creator_id)
            .bind(DeploymentStatus::Live.id())
            .fetch_optional(&mut *tx)
            .await?;

        match promoted {
            Some(deployment) => {
                tx.commit().await?;
                Ok(Some(deployment))
            }
            None => {
                tx.rollback().await?;
                Ok(None)
            }
        }
    }

    /// Deployments eligible to appear in a rollback picker: anything past
    /// the in-flight states (`live`, `rolled_back`, or `failed`), newest
    /// version first. `failed` rows are included for history display; the
    /// rollback path re-validates artifact presence regardless.
    pub async fn list_rollback_candidates(
        pool: &PgPool,
        instance_id: DbId,
        creator_id: DbId,
        platform: &str,
        limit: i64,
    ) -> Result<Vec<Deployment>, sqlx::Error> {
        let limit = limit.clamp(1, 100);
        let query = format!(
            "SELECT {COLUMNS} FROM deployments \
             WHERE instance_id = $1 AND creator_id = $2 AND platform = $3 \
               AND status_id NOT IN ($4, $5) \
             ORDER BY version DESC \
             LIMIT $6"
        );
        sqlx::query_as::<_, Deployment>(&query)
            .bind(instance_id)
            .bind(creator_id)
            .bind(platform)
            .bind(DeploymentStatus::Pending.id())
            .bind(DeploymentStatus::Building.id())
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// The deployment the live pointer currently designates for a target,
    /// if any.
    pub async fn find_live(
        pool: &PgPool,
        instance_id: DbId,
        platform: &str,
    ) -> Result<Option<Deployment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM deployments \
             WHERE id = (SELECT deployment_id FROM live_deployments \
                         WHERE instance_id = $1 AND platform = $2)"
        );
        sqlx::query_as::<_, Deployment>(&query)
            .bind(instance_id)
            .bind(platform)
            .fetch_optional(pool)
            .await
    }

    /// Read the raw pointer row for a target.
    pub async fn find_pointer(
        pool: &PgPool,
        instance_id: DbId,
        platform: &str,
    ) -> Result<Option<LiveDeployment>, sqlx::Error> {
        sqlx::query_as::<_, LiveDeployment>(
            "SELECT instance_id, platform, deployment_id, updated_at \
             FROM live_deployments WHERE instance_id = $1 AND platform = $2",
        )
        .bind(instance_id)
        .bind(platform)
        .fetch_optional(pool)
        .await
    }

    /// Atomically claim the oldest `pending` deployment for building.
    ///
    /// One transaction: lock the oldest pending row with
    /// `FOR UPDATE SKIP LOCKED`, then transition it to `building` and stamp
    /// `build_started_at`. A concurrent worker skips rows a sibling has
    /// locked, so each pending deployment is handed to exactly one worker
    /// and an empty queue reads as `Ok(None)` without contention.
    pub async fn claim_next_pending(pool: &PgPool) -> Result<Option<Deployment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let claimed: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM deployments WHERE status_id = $1 \
             ORDER BY created_at ASC LIMIT 1 \
             FOR UPDATE SKIP LOCKED",
        )
        .bind(DeploymentStatus::Pending.id())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(id) = claimed else {
            tx.commit().await?;
            return Ok(None);
        };

        let query = format!(
            "UPDATE deployments \
             SET status_id = $2, build_started_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let deployment = sqlx::query_as::<_, Deployment>(&query)
            .bind(id)
            .bind(DeploymentStatus::Building.id())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(deployment))
    }

    /// Reconciliation: fail `building` deployments whose build started
    /// before `older_than` (orphaned by a crash mid-pipeline). Returns the
    /// number of rows transitioned. The threshold is an operator decision;
    /// nothing in the engine runs this automatically.
    pub async fn fail_stale_building(
        pool: &PgPool,
        older_than: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE deployments \
             SET status_id = $1, error_message = 'Build abandoned (stale building state)' \
             WHERE status_id = $2 AND build_started_at < $3",
        )
        .bind(DeploymentStatus::Failed.id())
        .bind(DeploymentStatus::Building.id())
        .bind(older_than)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Upsert the live pointer for a target inside `tx`. This both records
    /// the new pointee and acts as the serialization point: a concurrent
    /// promotion for the same target blocks here until this transaction
    /// finishes.
    async fn move_pointer(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        instance_id: DbId,
        platform: &str,
        deployment_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO live_deployments (instance_id, platform, deployment_id) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (instance_id, platform) \
             DO UPDATE SET deployment_id = EXCLUDED.deployment_id, updated_at = NOW()",
        )
        .bind(instance_id)
        .bind(platform)
        .bind(deployment_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Demote every live deployment for a target (except the one being
    /// promoted) to `rolled_back`, stamping `rolled_back_at`.
    async fn demote_live(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        instance_id: DbId,
        platform: &str,
        creator_id: DbId,
        keep_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE deployments \
             SET status_id = $1, rolled_back_at = NOW() \
             WHERE instance_id = $2 AND platform = $3 AND creator_id = $4 \
               AND status_id = $5 AND id <> $6",
        )
        .bind(DeploymentStatus::RolledBack.id())
        .bind(instance_id)
        .bind(platform)
        .bind(creator_id)
        .bind(DeploymentStatus::Live.id())
        .bind(keep_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
