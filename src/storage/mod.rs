//! Object storage: where uploaded images and resource files live.

mod local;
mod memory;
pub mod upload;

use async_trait::async_trait;
use std::fmt;

pub use local::LocalFsStorage;
pub use memory::MemoryStorage;
pub use upload::{PendingUpload, object_name};

/// Failure reported by a storage backend; the message is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageError(pub String);

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for StorageError {}

/// An object that made it into storage, with the URL the public site links to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bucket: String,
    pub path: String,
    pub url: String,
    pub content_type: Option<String>,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Bucket names and object paths are single, plain path segments.
pub(crate) fn check_segment(kind: &str, value: &str) -> Result<(), StorageError> {
    let valid = !value.is_empty()
        && value != "."
        && value != ".."
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError(format!("Invalid {kind} '{value}'")))
    }
}
