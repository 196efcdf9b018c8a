use crate::keys::{validate_bucket, validate_key};
use crate::traits::{ObjectStorage, PublishError, SigningError, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const NONCE_BYTES: usize = 16;

/// Local filesystem storage implementation
///
/// Objects live at `<root>/<bucket>/<key>`. Signed URLs point at the API's
/// `/assets/{bucket}/{key}` route and carry `expires`, `nonce` and an
/// HMAC-SHA256 `signature` over all of bucket, key, expiry and nonce.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
    bucket: String,
    signing_key: Vec<u8>,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `root` - Root directory of the store (e.g., "/var/lib/tubely")
    /// * `base_url` - Public URL of the assets route (e.g., "http://localhost:8091/assets")
    /// * `bucket` - Bucket new objects are published to
    /// * `signing_key` - HMAC key for signed URLs
    pub async fn new(
        root: impl Into<PathBuf>,
        base_url: String,
        bucket: String,
        signing_key: impl AsRef<[u8]>,
    ) -> StorageResult<Self> {
        let root = root.into();
        validate_bucket(&bucket).map_err(StorageError::ConfigError)?;

        let bucket_dir = root.join(&bucket);
        fs::create_dir_all(&bucket_dir).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                bucket_dir.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            root,
            base_url,
            bucket,
            signing_key: signing_key.as_ref().to_vec(),
        })
    }

    /// Filesystem location of an object.
    pub fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, String> {
        validate_bucket(bucket)?;
        validate_key(key)?;
        Ok(self.root.join(bucket).join(key))
    }

    /// Check the query parameters of a signed URL and return the object's path.
    pub fn verify(
        &self,
        bucket: &str,
        key: &str,
        expires: u64,
        nonce: &str,
        signature: &str,
    ) -> Result<PathBuf, SigningError> {
        validate_bucket(bucket).map_err(SigningError::InvalidBucket)?;
        let path = self
            .object_path(bucket, key)
            .map_err(SigningError::InvalidKey)?;

        if unix_now() > expires {
            return Err(SigningError::Expired);
        }

        let expected = self.signature(bucket, key, expires, nonce);
        if expected.as_bytes().ct_eq(signature.as_bytes()).into() {
            Ok(path)
        } else {
            Err(SigningError::BadSignature)
        }
    }

    fn signature(&self, bucket: &str, key: &str, expires: u64, nonce: &str) -> String {
        let message = format!("{}\n{}\n{}\n{}", bucket, key, expires, nonce);
        let mut mac =
            HmacSha256::new_from_slice(&self.signing_key).expect("HMAC accepts any key size");
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        let encoded_key = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(bucket),
            encoded_key
        )
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    #[tracing::instrument(skip(self), fields(bucket = %self.bucket))]
    async fn publish(
        &self,
        local_path: &Path,
        key: &str,
        _content_type: &str,
    ) -> Result<(), PublishError> {
        let destination = self
            .object_path(&self.bucket, key)
            .map_err(PublishError::InvalidKey)?;

        let mut source = fs::File::open(local_path)
            .await
            .map_err(|source| PublishError::ReadSource {
                path: local_path.display().to_string(),
                source,
            })?;

        let parent = destination
            .parent()
            .ok_or_else(|| PublishError::InvalidKey(key.to_string()))?;
        fs::create_dir_all(parent)
            .await
            .map_err(|e| PublishError::UploadFailed(format!("Failed to create {}: {}", parent.display(), e)))?;

        let start = std::time::Instant::now();
        let staging = parent.join(format!(".{}.tmp", Uuid::new_v4()));

        let copied = async {
            let mut file = fs::File::create(&staging).await?;
            let size = tokio::io::copy(&mut source, &mut file).await?;
            file.flush().await?;
            file.sync_all().await?;
            fs::rename(&staging, &destination).await?;
            Ok::<u64, std::io::Error>(size)
        }
        .await;

        match copied {
            Ok(size) => {
                tracing::info!(
                    path = %destination.display(),
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local publish successful"
                );
                Ok(())
            }
            Err(e) => {
                let _ = fs::remove_file(&staging).await;
                tracing::error!(
                    error = %e,
                    path = %destination.display(),
                    key = %key,
                    "Local publish failed"
                );
                Err(PublishError::UploadFailed(e.to_string()))
            }
        }
    }

    async fn sign(&self, bucket: &str, key: &str, ttl: Duration) -> Result<String, SigningError> {
        validate_bucket(bucket).map_err(SigningError::InvalidBucket)?;
        validate_key(key).map_err(SigningError::InvalidKey)?;

        let expires = unix_now().saturating_add(ttl.as_secs());
        let mut nonce = [0u8; NONCE_BYTES];
        rand::rng().fill_bytes(&mut nonce);
        let nonce = hex::encode(nonce);
        let signature = self.signature(bucket, key, expires, &nonce);

        Ok(format!(
            "{}?expires={}&nonce={}&signature={}",
            self.object_url(bucket, key),
            expires,
            nonce,
            signature
        ))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
