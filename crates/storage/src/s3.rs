//! S3 storage backend (production).

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::StorageError;
use crate::StorageBackend;

/// S3-backed [`StorageBackend`].
#[derive(Debug, Clone)]
pub struct S3Backend {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Backend {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a backend from the ambient AWS environment (credentials chain,
    /// region, endpoint overrides).
    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(aws_sdk_s3::Client::new(&config), bucket)
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .cache_control(cache_control)
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("put_object failed for '{key}': {e}")))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(key, error = %e, "S3 artifact read failed");
                return None;
            }
        };

        match output.body.collect().await {
            Ok(data) => Some(data.into_bytes().to_vec()),
            Err(e) => {
                tracing::debug!(key, error = %e, "S3 artifact body read failed");
                None
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("delete_object failed for '{key}': {e}")))?;
        Ok(())
    }
}
