use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use super::{ObjectStorage, StorageError, check_segment};

/// Buckets as directories under `root`, served by the app under `/storage`.
pub struct LocalFsStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalFsStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStorage for LocalFsStorage {
    fn backend_tag(&self) -> &'static str {
        "localfs"
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        _content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        check_segment("bucket", bucket)?;
        check_segment("object path", path)?;

        let dir = self.root.join(bucket);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError(format!("Could not create bucket {bucket}: {e}")))?;

        let target = dir.join(path);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StorageError("The resource already exists".to_string()),
                _ => StorageError(format!("Upload failed: {e}")),
            })?;
        file.write_all(bytes)
            .await
            .map_err(|e| StorageError(format!("Upload failed: {e}")))?;
        file.flush()
            .await
            .map_err(|e| StorageError(format!("Upload failed: {e}")))?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/{bucket}/{path}", self.base_url)
    }
}
