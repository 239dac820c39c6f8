//! `sdui-worker` -- deployment build worker.
//!
//! Polls the ledger for `pending` deployments and runs the build pipeline
//! for each. Enqueueing (who inserts the pending row) is a dashboard/API
//! concern and lives elsewhere.
//!
//! # Environment variables
//!
//! | Variable                  | Required | Default | Description                         |
//! |---------------------------|----------|---------|-------------------------------------|
//! | `DATABASE_URL`            | yes      | --      | Postgres connection string          |
//! | `POLL_INTERVAL_SECS`      | no       | `5`     | Idle sleep between ledger polls     |
//! | `STORAGE_BACKEND`         | no       | `local` | `local` or `s3`                     |
//! | `STORAGE_PUBLIC_BASE_URL` | no       | see config | Public base URL for artifacts    |
//! | `STORAGE_BUCKET`          | for s3   | --      | S3 bucket name                      |
//! | `STORAGE_BASE_PATH`       | no       | `./artifacts` | Local backend base directory  |

use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sdui_db::repositories::DeploymentRepo;
use sdui_engine::Orchestrator;
use sdui_storage::{ArtifactStore, StorageConfig};

/// Default idle sleep between ledger polls.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sdui_worker=info,sdui_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
        tracing::error!("DATABASE_URL environment variable is required");
        std::process::exit(1);
    });

    let pool = sdui_db::create_pool(&database_url).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to connect to database");
        std::process::exit(1);
    });

    if let Err(e) = sdui_db::health_check(&pool).await {
        tracing::error!(error = %e, "Database health check failed");
        std::process::exit(1);
    }

    let config = StorageConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid storage configuration");
        std::process::exit(1);
    });
    let store = ArtifactStore::from_config(&config).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to initialize artifact store");
        std::process::exit(1);
    });

    let interval_secs: u64 = std::env::var("POLL_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
    let interval = Duration::from_secs(interval_secs);

    tracing::info!(poll_interval_secs = interval_secs, "Worker started");

    loop {
        // The claim locks and transitions the row in one transaction, so
        // concurrent workers never pick up the same deployment.
        match DeploymentRepo::claim_next_pending(&pool).await {
            Ok(Some(deployment)) => {
                let deployment_id = deployment.id;
                tracing::info!(
                    deployment_id,
                    creator_id = deployment.creator_id,
                    platform = %deployment.platform,
                    version = deployment.version,
                    "Claimed pending deployment"
                );
                let result = Orchestrator::build_claimed(&pool, &store, deployment).await;
                if result.success {
                    tracing::info!(
                        deployment_id,
                        duration_ms = result.duration_ms,
                        "Build succeeded"
                    );
                } else {
                    tracing::warn!(
                        deployment_id,
                        error = result.error.as_deref().unwrap_or("unknown"),
                        duration_ms = result.duration_ms,
                        "Build failed"
                    );
                }
                // Another deployment may already be waiting; poll again
                // without sleeping.
            }
            Ok(None) => tokio::time::sleep(interval).await,
            Err(e) => {
                tracing::error!(error = %e, "Ledger poll failed");
                tokio::time::sleep(interval).await;
            }
        }
    }
}
