//! Storage configuration loaded from environment variables.

use crate::error::StorageError;

/// Which provider backs the artifact store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackendKind {
    Local,
    S3,
}

/// Artifact store configuration.
///
/// All fields have defaults suitable for local development; production
/// overrides via environment variables.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Selected provider (default: `local`).
    pub backend: StorageBackendKind,
    /// Base URL artifacts are served from, prepended to object keys.
    pub public_base_url: String,
    /// S3 bucket name. Required when `backend` is `s3`.
    pub bucket: Option<String>,
    /// Base directory for the local backend (default: `./artifacts`).
    pub base_path: String,
}

impl StorageConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                            |
    /// |---------------------------|------------------------------------|
    /// | `STORAGE_BACKEND`         | `local`                            |
    /// | `STORAGE_PUBLIC_BASE_URL` | `http://localhost:3000/artifacts`  |
    /// | `STORAGE_BUCKET`          | -- (required for `s3`)             |
    /// | `STORAGE_BASE_PATH`       | `./artifacts`                      |
    pub fn from_env() -> Result<Self, StorageError> {
        let backend = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".into())
            .as_str()
        {
            "local" => StorageBackendKind::Local,
            "s3" => StorageBackendKind::S3,
            other => {
                return Err(StorageError::Config(format!(
                    "Unknown STORAGE_BACKEND '{other}'. Must be one of: local, s3"
                )));
            }
        };

        let public_base_url = std::env::var("STORAGE_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000/artifacts".into());

        let bucket = std::env::var("STORAGE_BUCKET").ok();
        if backend == StorageBackendKind::S3 && bucket.is_none() {
            return Err(StorageError::Config(
                "STORAGE_BUCKET is required when STORAGE_BACKEND=s3".into(),
            ));
        }

        let base_path = std::env::var("STORAGE_BASE_PATH").unwrap_or_else(|_| "./artifacts".into());

        Ok(Self {
            backend,
            public_base_url,
            bucket,
            base_path,
        })
    }
}
