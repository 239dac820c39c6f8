//! High-level artifact store: JSON documents in, public URLs out.

use sdui_core::artifact::{ARTIFACT_CACHE_CONTROL, ARTIFACT_CONTENT_TYPE};

use crate::config::{StorageBackendKind, StorageConfig};
use crate::error::StorageError;
use crate::local::LocalBackend;
use crate::s3::S3Backend;
use crate::StorageBackend;

/// Owns a [`StorageBackend`] plus the public URL policy. Documents are
/// uploaded with immutable cache headers; content at a given key never
/// changes once its deployment reaches a terminal state.
pub struct ArtifactStore {
    backend: Box<dyn StorageBackend>,
    public_base_url: String,
}

impl ArtifactStore {
    pub fn new(backend: Box<dyn StorageBackend>, public_base_url: impl Into<String>) -> Self {
        Self {
            backend,
            public_base_url: public_base_url.into(),
        }
    }

    /// Construct the configured backend and wrap it.
    pub async fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let backend: Box<dyn StorageBackend> = match config.backend {
            StorageBackendKind::Local => Box::new(LocalBackend::new(&config.base_path)),
            StorageBackendKind::S3 => {
                let bucket = config
                    .bucket
                    .as_deref()
                    .ok_or_else(|| StorageError::Config("S3 backend requires a bucket".into()))?;
                Box::new(S3Backend::from_env(bucket).await)
            }
        };
        Ok(Self::new(backend, config.public_base_url.clone()))
    }

    /// Public URL for a key. Pure string composition, no I/O.
    pub fn public_url(&self, key: &str) -> String {
        sdui_core::artifact::public_url(&self.public_base_url, key)
    }

    /// Serialize and upload a document, returning its public URL. Upload
    /// failures propagate; a deployment must never go live on a dropped
    /// write.
    pub async fn upload_document(
        &self,
        key: &str,
        document: &serde_json::Value,
    ) -> Result<String, StorageError> {
        let bytes = serde_json::to_vec(document)?;
        self.backend
            .put(key, bytes, ARTIFACT_CONTENT_TYPE, ARTIFACT_CACHE_CONTROL)
            .await?;
        tracing::debug!(key, "Uploaded artifact");
        Ok(self.public_url(key))
    }

    /// Download and parse a document. `None` on missing key, read failure,
    /// or unparseable content; read paths treat all three as "not there".
    pub async fn download_document(&self, key: &str) -> Option<serde_json::Value> {
        let bytes = self.backend.get(key).await?;
        match serde_json::from_slice(&bytes) {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::warn!(key, error = %e, "Artifact exists but is not valid JSON");
                None
            }
        }
    }

    /// Best-effort removal. Not used by build or rollback; reserved for
    /// retention/cleanup policies.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.backend.delete(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdui_core::artifact::screen_key;
    use serde_json::json;

    fn store(dir: &tempfile::TempDir) -> ArtifactStore {
        ArtifactStore::new(
            Box::new(LocalBackend::new(dir.path())),
            "https://cdn.example.com",
        )
    }

    #[tokio::test]
    async fn upload_returns_public_url_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let key = screen_key(7, 42);

        let url = store
            .upload_document(&key, &json!({ "sections": [] }))
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/deployments/7/42/screen.json");

        let doc = store.download_document(&key).await.unwrap();
        assert_eq!(doc, json!({ "sections": [] }));
    }

    #[tokio::test]
    async fn download_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        assert!(store.download_document("deployments/1/1/screen.json").await.is_none());
    }

    #[tokio::test]
    async fn download_corrupt_content_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path());
        backend
            .put("bad.json", b"not json".to_vec(), "application/json", "public")
            .await
            .unwrap();

        let store = ArtifactStore::new(Box::new(backend), "https://cdn.example.com");
        assert!(store.download_document("bad.json").await.is_none());
    }
}
