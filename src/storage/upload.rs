//! The upload pipeline: a selected file becomes a stored object with a public URL.
//!
//! Stored names are random (`<uuid>.<ext>`) so two uploads of `report.pdf` never
//! collide; only the extension of the original name survives.

use uuid::Uuid;

use crate::models::{ContentKind, ValidationError};
use super::{ObjectStorage, StorageError, StoredObject};

/// A file received with a form submission, not yet stored.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Lower-cased extension of a client-supplied file name, if it has a usable one.
pub fn extension(file_name: &str) -> Option<String> {
    // Browsers on Windows may send a full path.
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn object_name(file_name: &str) -> String {
    let id = Uuid::new_v4();
    match extension(file_name) {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

/// Reject a file before anything is sent to storage.
pub fn check_upload(kind: ContentKind, file: &PendingUpload, max_bytes: usize) -> Result<(), ValidationError> {
    if file.bytes.is_empty() {
        return Err(ValidationError("The selected file is empty".to_string()));
    }
    if file.bytes.len() > max_bytes {
        return Err(ValidationError(format!(
            "The selected file is larger than {} MB",
            max_bytes / (1024 * 1024)
        )));
    }
    let allowed = kind.allowed_extensions();
    match extension(&file.file_name) {
        Some(ext) if allowed.contains(&ext.as_str()) => Ok(()),
        _ => Err(ValidationError(format!(
            "Unsupported file type. Allowed: {}",
            allowed.join(", ")
        ))),
    }
}

/// Store the file under a fresh name and resolve its public URL.
pub async fn upload(
    storage: &dyn ObjectStorage,
    bucket: &str,
    file: &PendingUpload,
) -> Result<StoredObject, StorageError> {
    let path = object_name(&file.file_name);
    storage
        .upload(bucket, &path, &file.bytes, file.content_type.as_deref())
        .await?;
    let url = storage.public_url(bucket, &path);
    log::info!(
        "Stored {} ({} bytes) as {bucket}/{path} via {}",
        file.file_name,
        file.bytes.len(),
        storage.backend_tag()
    );
    Ok(StoredObject {
        bucket: bucket.to_string(),
        path,
        url,
        content_type: file.content_type.clone(),
    })
}
