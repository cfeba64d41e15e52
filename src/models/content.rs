//! Shared shape of the three dashboard-managed collections (news, events, resources).
//!
//! Each collection has a stored record type implementing [`ContentRecord`] and a
//! form-side draft implementing [`Draft`]. Drafts are what the dashboard form edits;
//! a successful write turns a draft into a record (insert) or overwrites every
//! writable column of an existing record with it (update).

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::storage::StoredObject;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    News,
    Event,
    Resource,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const RESOURCE_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "jpg", "jpeg", "png", "gif"];

impl ContentKind {
    pub fn table(self) -> &'static str {
        match self {
            ContentKind::News => "news_items",
            ContentKind::Event => "events",
            ContentKind::Resource => "resources",
        }
    }

    /// Object-storage bucket that uploads for this collection go to.
    pub fn bucket(self) -> &'static str {
        match self {
            ContentKind::News => "news-media",
            ContentKind::Event => "event-media",
            ContentKind::Resource => "resources",
        }
    }

    /// Path segment under `/dashboard`.
    pub fn slug(self) -> &'static str {
        match self {
            ContentKind::News => "news",
            ContentKind::Event => "events",
            ContentKind::Resource => "resources",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            ContentKind::News => "News item",
            ContentKind::Event => "Event",
            ContentKind::Resource => "Resource",
        }
    }

    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            ContentKind::News | ContentKind::Event => IMAGE_EXTENSIONS,
            ContentKind::Resource => RESOURCE_EXTENSIONS,
        }
    }

    pub fn dashboard_path(self) -> String {
        format!("/dashboard/{}", self.slug())
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// A rule violated by a draft. Never reaches a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ValidationError {
    fn from(msg: String) -> Self {
        ValidationError(msg)
    }
}

/// Text fields of a submitted form, keyed by input name.
#[derive(Debug, Clone, Default)]
pub struct FormFields(HashMap<String, String>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Raw value, empty when absent.
    pub fn raw(&self, name: &str) -> &str {
        self.0.get(name).map(String::as_str).unwrap_or("")
    }

    /// Trimmed value, empty when absent.
    pub fn text(&self, name: &str) -> String {
        self.raw(name).trim().to_string()
    }

    /// Trimmed value, `None` when absent or blank.
    pub fn optional(&self, name: &str) -> Option<String> {
        let value = self.raw(name).trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    /// Checkbox semantics: browsers send `on` for a ticked box and nothing otherwise.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.raw(name).trim(), "on" | "true" | "1" | "yes")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FormFields(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

pub trait Draft: Clone + Default + Send + Sync + 'static {
    fn from_fields(fields: &FormFields) -> Self;

    /// Check the draft and report the first violated rule.
    ///
    /// `creating` is false for edits of an existing record; `pending_upload` is true
    /// when a file accompanies the submission and will be uploaded before the write.
    fn validate(&self, creating: bool, pending_upload: bool) -> Result<(), ValidationError>;

    /// Point the draft's file field at a freshly stored object.
    fn attach_upload(&mut self, stored: &StoredObject);

    /// URL of the file this draft points at, if any.
    fn media_url(&self) -> Option<&str>;

    /// Take the file fields (URL and anything derived from it) from `other`.
    fn copy_media(&mut self, other: &Self);

    fn published(&self) -> bool;
}

pub trait ContentRecord: Clone + Send + Sync + 'static {
    type Draft: Draft;
    const KIND: ContentKind;

    fn id(&self) -> Uuid;
    fn title(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn published(&self) -> bool;

    /// Copy this record's editable fields into a form draft.
    fn to_draft(&self) -> Self::Draft;

    /// Build a fresh record, for stores that assign ids themselves.
    fn from_draft(id: Uuid, created_at: DateTime<Utc>, draft: &Self::Draft) -> Self;

    /// Full overwrite of every writable column.
    fn apply_draft(&mut self, draft: &Self::Draft);

    fn set_published(&mut self, published: bool);
}
