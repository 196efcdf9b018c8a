use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tubely_core::StorageBackend;
use tubely_storage::{LocalStorage, ObjectStorage, PublishError, SigningError};

/// Local store that counts publish calls, with an optional injected publish failure.
pub struct CountingStorage {
    inner: Arc<LocalStorage>,
    publishes: AtomicUsize,
    fail_publishes: AtomicBool,
}

impl CountingStorage {
    pub fn new(inner: Arc<LocalStorage>) -> Self {
        Self {
            inner,
            publishes: AtomicUsize::new(0),
            fail_publishes: AtomicBool::new(false),
        }
    }

    pub fn fail_publishes(&self) {
        self.fail_publishes.store(true, Ordering::SeqCst);
    }

    pub fn publish_count(&self) -> usize {
        self.publishes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStorage for CountingStorage {
    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    async fn publish(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<(), PublishError> {
        self.publishes.fetch_add(1, Ordering::SeqCst);
        if self.fail_publishes.load(Ordering::SeqCst) {
            return Err(PublishError::UploadFailed("injected publish failure".to_string()));
        }
        self.inner.publish(local_path, key, content_type).await
    }

    async fn sign(&self, bucket: &str, key: &str, ttl: Duration) -> Result<String, SigningError> {
        self.inner.sign(bucket, key, ttl).await
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}
