use crate::keys::{validate_bucket, validate_key};
use crate::traits::{ObjectStorage, PublishError, SigningError, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::buffered::BufWriter;
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{Attribute, Attributes, ObjectStore, Result as ObjectResult};
use std::path::Path as LocalPath;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<AmazonS3>,
    /// Region, endpoint and credentials without a bucket; used to address other buckets when signing.
    template: AmazonS3Builder,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket that new objects are published to
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(bucket: String, region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        Self::from_builder(AmazonS3Builder::from_env(), bucket, region, endpoint_url)
    }

    pub(crate) fn from_builder(
        builder: AmazonS3Builder,
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        validate_bucket(&bucket).map_err(StorageError::ConfigError)?;

        let mut template = builder.with_region(region);
        if let Some(endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            template = template.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        let store = template
            .clone()
            .with_bucket_name(bucket.clone())
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store: Arc::new(store),
            template,
            bucket,
        })
    }

    /// Store handle able to sign for `bucket`.
    fn store_for(&self, bucket: &str) -> Result<Arc<AmazonS3>, SigningError> {
        if bucket == self.bucket {
            return Ok(self.store.clone());
        }
        validate_bucket(bucket).map_err(SigningError::InvalidBucket)?;
        let store = self
            .template
            .clone()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| SigningError::Backend(e.to_string()))?;
        Ok(Arc::new(store))
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    #[tracing::instrument(skip(self), fields(bucket = %self.bucket))]
    async fn publish(
        &self,
        local_path: &LocalPath,
        key: &str,
        content_type: &str,
    ) -> Result<(), PublishError> {
        validate_key(key).map_err(PublishError::InvalidKey)?;

        let mut file = tokio::fs::File::open(local_path)
            .await
            .map_err(|source| PublishError::ReadSource {
                path: local_path.display().to_string(),
                source,
            })?;

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());

        let store: Arc<dyn ObjectStore> = self.store.clone();
        let mut writer = BufWriter::new(store, Path::from(key)).with_attributes(attributes);

        let start = std::time::Instant::now();

        let result = match tokio::io::copy(&mut file, &mut writer).await {
            Ok(size) => writer.shutdown().await.map(|_| size),
            Err(e) => Err(e),
        };

        match result {
            Ok(size) => {
                tracing::info!(
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 publish successful"
                );
                Ok(())
            }
            Err(e) => {
                let aborted: ObjectResult<()> = writer.abort().await;
                if let Err(abort_err) = aborted {
                    tracing::warn!(error = %abort_err, key = %key, "Failed to abort S3 upload");
                }
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 publish failed"
                );
                Err(PublishError::UploadFailed(e.to_string()))
            }
        }
    }

    async fn sign(&self, bucket: &str, key: &str, ttl: Duration) -> Result<String, SigningError> {
        validate_key(key).map_err(SigningError::InvalidKey)?;
        let store = self.store_for(bucket)?;

        let url_result: ObjectResult<_> = store
            .signed_url(Method::GET, &Path::from(key), ttl)
            .await;

        let url = url_result
            .map_err(|e| SigningError::Backend(e.to_string()))?
            .to_string();

        Ok(url)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(endpoint: Option<&str>) -> S3Storage {
        let builder = AmazonS3Builder::new()
            .with_access_key_id("AKIDEXAMPLE")
            .with_secret_access_key("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY");
        S3Storage::from_builder(
            builder,
            "tubely-videos".to_string(),
            "us-east-2".to_string(),
            endpoint.map(String::from),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn presigns_get_for_configured_bucket() {
        let storage = storage(None);
        let url = storage
            .sign("tubely-videos", "landscape/abc.mp4", Duration::from_secs(300))
            .await
            .unwrap();
        assert!(url.contains("tubely-videos"));
        assert!(url.contains("landscape/abc.mp4"));
        assert!(url.contains("X-Amz-Signature="));
        assert!(url.contains("X-Amz-Expires=300"));
    }

    #[tokio::test]
    async fn presigns_for_another_bucket() {
        let storage = storage(Some("http://localhost:9000"));
        let url = storage
            .sign("archive", "portrait/x.mp4", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:9000"));
        assert!(url.contains("archive"));
        assert!(!url.contains("tubely-videos"));
    }

    #[tokio::test]
    async fn rejects_unaddressable_pairs() {
        let storage = storage(None);
        assert!(matches!(
            storage.sign("bad/bucket", "k.mp4", Duration::from_secs(1)).await,
            Err(SigningError::InvalidBucket(_))
        ));
        assert!(matches!(
            storage.sign("tubely-videos", "../k.mp4", Duration::from_secs(1)).await,
            Err(SigningError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn publish_of_missing_file_fails_before_upload() {
        let storage = storage(None);
        let result = storage
            .publish(
                LocalPath::new("/nonexistent/tubely.mp4"),
                "landscape/a.mp4",
                "video/mp4",
            )
            .await;
        assert!(matches!(result, Err(PublishError::ReadSource { .. })));
    }
}
