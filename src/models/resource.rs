use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::validate::{first_error, validate_optional, validate_required};
use crate::models::content::{ContentKind, ContentRecord, Draft, FormFields, ValidationError};
use crate::storage::StoredObject;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    Reports,
    Guides,
    Forms,
    Presentations,
    Other,
}

impl ResourceCategory {
    pub const ALL: [ResourceCategory; 5] = [
        ResourceCategory::Reports,
        ResourceCategory::Guides,
        ResourceCategory::Forms,
        ResourceCategory::Presentations,
        ResourceCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceCategory::Reports => "reports",
            ResourceCategory::Guides => "guides",
            ResourceCategory::Forms => "forms",
            ResourceCategory::Presentations => "presentations",
            ResourceCategory::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResourceCategory::Reports => "Reports",
            ResourceCategory::Guides => "Guides",
            ResourceCategory::Forms => "Forms",
            ResourceCategory::Presentations => "Presentations",
            ResourceCategory::Other => "Other",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|c| c.as_str().eq_ignore_ascii_case(raw))
    }
}

/// A row of `resources`: a downloadable file with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Resource {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    pub file_type: Option<String>,
    pub category: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

impl Resource {
    pub fn category_label(&self) -> &str {
        self.category
            .as_deref()
            .and_then(ResourceCategory::parse)
            .map(ResourceCategory::label)
            .unwrap_or("N/A")
    }

    pub fn file_type_label(&self) -> &str {
        self.file_type.as_deref().unwrap_or("N/A")
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub file_url: Option<String>,
    pub file_type: Option<String>,
    pub published: bool,
}

impl ResourceDraft {
    pub fn is_category(&self, value: &str) -> bool {
        self.category == value
    }

    pub fn file(&self) -> &str {
        self.file_url.as_deref().unwrap_or("")
    }

    pub fn file_type_value(&self) -> &str {
        self.file_type.as_deref().unwrap_or("")
    }

    fn category_value(&self) -> Option<String> {
        ResourceCategory::parse(&self.category).map(|c| c.as_str().to_string())
    }
}

impl Draft for ResourceDraft {
    fn from_fields(fields: &FormFields) -> Self {
        Self {
            title: fields.text("title"),
            description: fields.raw("description").to_string(),
            category: fields.text("category"),
            file_url: fields.optional("file_url"),
            file_type: fields.optional("file_type"),
            published: fields.flag("published"),
        }
    }

    fn validate(&self, creating: bool, pending_upload: bool) -> Result<(), ValidationError> {
        let category_error = (!self.category.is_empty() && ResourceCategory::parse(&self.category).is_none())
            .then(|| "Category must be one of reports, guides, forms, presentations, other".to_string());
        let file_error = (creating && self.file_url.is_none() && !pending_upload)
            .then(|| "Please upload a file".to_string());
        match first_error([
            validate_required(&self.title, "Title", 200),
            validate_optional(&self.description, "Description", 2_000),
            category_error,
            file_error,
        ]) {
            Some(msg) => Err(ValidationError(msg)),
            None => Ok(()),
        }
    }

    fn attach_upload(&mut self, stored: &StoredObject) {
        self.file_url = Some(stored.url.clone());
        // A new file always replaces the recorded type; fall back to the extension
        // when the browser sent no content type.
        self.file_type = stored
            .content_type
            .clone()
            .or_else(|| crate::storage::upload::extension(&stored.path).map(|ext| ext.to_ascii_uppercase()));
    }

    fn media_url(&self) -> Option<&str> {
        self.file_url.as_deref()
    }

    fn copy_media(&mut self, other: &Self) {
        self.file_url = other.file_url.clone();
        self.file_type = other.file_type.clone();
    }

    fn published(&self) -> bool {
        self.published
    }
}

impl ContentRecord for Resource {
    type Draft = ResourceDraft;
    const KIND: ContentKind = ContentKind::Resource;

    fn id(&self) -> Uuid {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn published(&self) -> bool {
        self.published
    }

    fn to_draft(&self) -> ResourceDraft {
        ResourceDraft {
            title: self.title.clone(),
            description: self.description.clone().unwrap_or_default(),
            category: self.category.clone().unwrap_or_default(),
            file_url: Some(self.file_url.clone()),
            file_type: self.file_type.clone(),
            published: self.published,
        }
    }

    fn from_draft(id: Uuid, created_at: DateTime<Utc>, draft: &ResourceDraft) -> Self {
        let mut resource = Resource {
            id,
            title: String::new(),
            description: None,
            file_url: String::new(),
            file_type: None,
            category: None,
            published: false,
            created_at,
        };
        resource.apply_draft(draft);
        resource
    }

    fn apply_draft(&mut self, draft: &ResourceDraft) {
        self.title = draft.title.trim().to_string();
        let description = draft.description.trim();
        self.description = (!description.is_empty()).then(|| description.to_string());
        self.category = draft.category_value();
        if let Some(url) = &draft.file_url {
            self.file_url = url.clone();
        }
        self.file_type = draft.file_type.clone();
        self.published = draft.published;
    }

    fn set_published(&mut self, published: bool) {
        self.published = published;
    }
}
