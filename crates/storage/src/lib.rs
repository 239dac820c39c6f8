//! Artifact Store: durable, immutable blob storage for resolved documents.
//!
//! The [`StorageBackend`] trait is the provider seam; production uses
//! [`s3::S3Backend`], development and tests use [`local::LocalBackend`].
//! [`store::ArtifactStore`] sits on top and owns serialization, cache
//! headers, and key/URL policy.

pub mod config;
pub mod error;
pub mod local;
pub mod s3;
pub mod store;

pub use config::{StorageBackendKind, StorageConfig};
pub use error::StorageError;
pub use local::LocalBackend;
pub use s3::S3Backend;
pub use store::ArtifactStore;

use async_trait::async_trait;

/// Raw blob operations a storage provider must supply.
///
/// `get` deliberately returns `Option` rather than `Result`: a missing key
/// and a failed read are both "not available" to this subsystem. Callers
/// that need an artifact to exist consult the ledger's `artifact_url`, not
/// storage probes.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write a blob. Must fail loudly; a silently dropped write would let a
    /// deployment go live without a durable artifact.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> Result<(), StorageError>;

    /// Read a blob. `None` on missing key or any read failure.
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Best-effort removal. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
