use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};

use super::{ObjectStorage, StorageError, check_segment};

/// In-process object storage. `fail_next` makes the next upload fail with a given message.
#[derive(Default)]
pub struct MemoryStorage {
    objects: RwLock<HashMap<(String, String), Vec<u8>>>,
    fail_next: Mutex<Option<String>>,
    upload_calls: AtomicU64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_next(&self, message: &str) {
        *self.fail_next.lock().await = Some(message.to_string());
    }

    pub async fn object(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub fn upload_calls(&self) -> u64 {
        self.upload_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        _content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        self.upload_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(message) = self.fail_next.lock().await.take() {
            return Err(StorageError(message));
        }
        check_segment("bucket", bucket)?;
        check_segment("object path", path)?;

        let mut objects = self.objects.write().await;
        let key = (bucket.to_string(), path.to_string());
        if objects.contains_key(&key) {
            return Err(StorageError("The resource already exists".to_string()));
        }
        objects.insert(key, bytes.to_vec());
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("/storage/{bucket}/{path}")
    }
}
