//! Resource Manager: the list + form logic shared by the news, events and
//! resources tabs.
//!
//! A submission runs validate, then upload, then write, and stops at the first
//! failure. The caller gets the draft back on every failure so the form can be
//! re-rendered with what the supervisor typed.
//!
//! File URLs arrive as hidden form fields, so a submitted URL is only kept when
//! this storage issued it for the collection's bucket, or when it is the URL the
//! edited record already has.

use std::fmt;

use uuid::Uuid;

use crate::models::{ContentRecord, Draft, ValidationError};
use crate::storage::upload::{self, PendingUpload, check_upload};
use crate::storage::{ObjectStorage, StorageError};
use crate::store::{ListQuery, RecordStore, StoreError};

/// The form region of a tab.
#[derive(Debug, Clone, PartialEq)]
pub enum FormMode<D> {
    Creating(D),
    Editing { id: Uuid, draft: D },
}

impl<D: Draft> FormMode<D> {
    pub fn blank() -> Self {
        FormMode::Creating(D::default())
    }

    pub fn draft(&self) -> &D {
        match self {
            FormMode::Creating(draft) | FormMode::Editing { draft, .. } => draft,
        }
    }

    pub fn draft_mut(&mut self) -> &mut D {
        match self {
            FormMode::Creating(draft) | FormMode::Editing { draft, .. } => draft,
        }
    }

    pub fn editing_id(&self) -> Option<Uuid> {
        match self {
            FormMode::Creating(_) => None,
            FormMode::Editing { id, .. } => Some(*id),
        }
    }

    pub fn is_creating(&self) -> bool {
        matches!(self, FormMode::Creating(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    Validation(ValidationError),
    Upload(StorageError),
    Backend(StoreError),
}

impl SubmitError {
    pub fn is_validation(&self) -> bool {
        matches!(self, SubmitError::Validation(_))
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Validation(e) => write!(f, "{e}"),
            SubmitError::Upload(e) => write!(f, "{e}"),
            SubmitError::Backend(e) => write!(f, "{e}"),
        }
    }
}

/// A failed submission, holding the form as it should be shown again. After a
/// failed write this includes the URL of a file that was already uploaded.
#[derive(Debug, Clone)]
pub struct Rejected<D> {
    pub mode: FormMode<D>,
    pub error: SubmitError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Saved {
    Created(Uuid),
    Updated(Uuid),
}

impl Saved {
    pub fn id(self) -> Uuid {
        match self {
            Saved::Created(id) | Saved::Updated(id) => id,
        }
    }
}

/// Proof that the supervisor answered the delete prompt. Only obtainable from the
/// confirmation form's answer.
#[derive(Debug, Clone, Copy)]
pub struct Confirmed(());

impl Confirmed {
    pub fn from_answer(answer: &str) -> Option<Self> {
        (answer.trim() == "yes").then_some(Confirmed(()))
    }
}

pub struct ResourceManager<'a, T: ContentRecord> {
    store: &'a dyn RecordStore<T>,
    storage: &'a dyn ObjectStorage,
    max_upload_bytes: usize,
}

impl<'a, T: ContentRecord> ResourceManager<'a, T> {
    pub fn new(store: &'a dyn RecordStore<T>, storage: &'a dyn ObjectStorage, max_upload_bytes: usize) -> Self {
        Self { store, storage, max_upload_bytes }
    }

    /// Full list, newest first.
    pub async fn list(&self) -> Result<Vec<T>, StoreError> {
        self.store.list(ListQuery::newest_first()).await
    }

    /// True for a URL this storage handed out for one object in `T`'s bucket.
    pub fn is_issued_url(&self, url: &str) -> bool {
        let prefix = self.storage.public_url(T::KIND.bucket(), "");
        url.strip_prefix(prefix.as_str())
            .is_some_and(|name| !name.is_empty() && name != ".." && !name.contains(['/', '\\', '?', '#']))
    }

    pub async fn submit(
        &self,
        mut mode: FormMode<T::Draft>,
        file: Option<PendingUpload>,
    ) -> Result<Saved, Rejected<T::Draft>> {
        let reject = |mode: FormMode<T::Draft>, error: SubmitError| -> Result<Saved, Rejected<T::Draft>> {
            Err(Rejected { mode, error })
        };

        if mode.is_creating() && mode.draft().media_url().is_some_and(|url| !self.is_issued_url(url)) {
            log::warn!("Ignoring a submitted {} file URL this storage did not issue", T::KIND.singular());
            mode.draft_mut().copy_media(&T::Draft::default());
        }

        if let Err(e) = mode.draft().validate(mode.is_creating(), file.is_some()) {
            return reject(mode, SubmitError::Validation(e));
        }

        if let Some(id) = mode.editing_id() {
            if let Err(e) = self.keep_recorded_media(id, mode.draft_mut()).await {
                return reject(mode, SubmitError::Backend(e));
            }
        }

        let mut draft = mode.draft().clone();
        if let Some(file) = &file {
            if let Err(e) = check_upload(T::KIND, file, self.max_upload_bytes) {
                return reject(mode, SubmitError::Validation(e));
            }
            match upload::upload(self.storage, T::KIND.bucket(), file).await {
                Ok(stored) => draft.attach_upload(&stored),
                Err(e) => {
                    log::warn!("Upload to {} failed: {e}", T::KIND.bucket());
                    return reject(mode, SubmitError::Upload(e));
                }
            }
        }

        let written = match &mode {
            FormMode::Creating(_) => self.store.insert(&draft).await.map(|r| Saved::Created(r.id())),
            FormMode::Editing { id, .. } => self.store.update(*id, &draft).await.map(|r| Saved::Updated(r.id())),
        };
        match written {
            Ok(saved) => {
                log::info!("{} saved: {saved:?}", T::KIND.singular());
                Ok(saved)
            }
            Err(e) => {
                log::error!("Writing {} failed: {e}", T::KIND.singular());
                // The uploaded object stays in storage. Hand its URL back so a retry
                // writes it without uploading the file again.
                *mode.draft_mut() = draft;
                reject(mode, SubmitError::Backend(e))
            }
        }
    }

    /// On edit, a file URL the storage did not issue must be the one the record
    /// already has; anything else is replaced by the recorded file fields.
    async fn keep_recorded_media(&self, id: Uuid, draft: &mut T::Draft) -> Result<(), StoreError> {
        let Some(url) = draft.media_url() else {
            return Ok(());
        };
        if self.is_issued_url(url) {
            return Ok(());
        }
        let items = self.list().await?;
        let recorded = items
            .iter()
            .find(|item| item.id() == id)
            .map(T::to_draft)
            .unwrap_or_default();
        if recorded.media_url() != draft.media_url() {
            log::warn!("Ignoring a submitted file URL for {} {id}", T::KIND.singular());
            draft.copy_media(&recorded);
        }
        Ok(())
    }

    /// Switch the form to editing one of the listed records.
    pub fn begin_edit(&self, items: &[T], id: Uuid) -> Option<FormMode<T::Draft>> {
        items
            .iter()
            .find(|item| item.id() == id)
            .map(|item| FormMode::Editing { id, draft: item.to_draft() })
    }

    pub async fn toggle_published(&self, id: Uuid, current: bool) -> Result<T, StoreError> {
        let record = self.store.set_published(id, !current).await?;
        log::info!("{} {id} published={}", T::KIND.singular(), record.published());
        Ok(record)
    }

    pub async fn delete(&self, id: Uuid, _confirmed: Confirmed) -> Result<(), StoreError> {
        self.store.delete(id).await?;
        log::info!("{} {id} deleted", T::KIND.singular());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_yes_confirms() {
        assert!(Confirmed::from_answer("yes").is_some());
        assert!(Confirmed::from_answer(" yes ").is_some());
        assert!(Confirmed::from_answer("no").is_none());
        assert!(Confirmed::from_answer("").is_none());
    }
}
