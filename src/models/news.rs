use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::validate::{first_error, validate_optional, validate_required};
use crate::models::content::{ContentKind, ContentRecord, Draft, FormFields, ValidationError};
use crate::storage::StoredObject;

/// A row of `news_items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NewsItem {
    pub id: Uuid,
    pub category: String,
    pub title: String,
    pub excerpt: String,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

impl NewsItem {
    pub fn date_label(&self) -> String {
        self.created_at.format("%B %-d, %Y").to_string()
    }

    pub fn image(&self) -> &str {
        self.image_url.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsDraft {
    pub category: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub image_url: Option<String>,
    pub published: bool,
}

impl NewsDraft {
    pub fn content_opt(&self) -> Option<String> {
        let content = self.content.trim();
        (!content.is_empty()).then(|| content.to_string())
    }

    pub fn image(&self) -> &str {
        self.image_url.as_deref().unwrap_or("")
    }
}

impl Draft for NewsDraft {
    fn from_fields(fields: &FormFields) -> Self {
        Self {
            category: fields.text("category"),
            title: fields.text("title"),
            excerpt: fields.text("excerpt"),
            content: fields.raw("content").to_string(),
            image_url: fields.optional("image_url"),
            published: fields.flag("published"),
        }
    }

    fn validate(&self, _creating: bool, _pending_upload: bool) -> Result<(), ValidationError> {
        match first_error([
            validate_required(&self.category, "Category", 100),
            validate_required(&self.title, "Title", 200),
            validate_required(&self.excerpt, "Excerpt", 500),
            validate_optional(&self.content, "Content", 20_000),
        ]) {
            Some(msg) => Err(ValidationError(msg)),
            None => Ok(()),
        }
    }

    fn attach_upload(&mut self, stored: &StoredObject) {
        self.image_url = Some(stored.url.clone());
    }

    fn media_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    fn copy_media(&mut self, other: &Self) {
        self.image_url = other.image_url.clone();
    }

    fn published(&self) -> bool {
        self.published
    }
}

impl ContentRecord for NewsItem {
    type Draft = NewsDraft;
    const KIND: ContentKind = ContentKind::News;

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

    fn to_draft(&self) -> NewsDraft {
        NewsDraft {
            category: self.category.clone(),
            title: self.title.clone(),
            excerpt: self.excerpt.clone(),
            content: self.content.clone().unwrap_or_default(),
            image_url: self.image_url.clone(),
            published: self.published,
        }
    }

    fn from_draft(id: Uuid, created_at: DateTime<Utc>, draft: &NewsDraft) -> Self {
        let mut item = NewsItem {
            id,
            category: String::new(),
            title: String::new(),
            excerpt: String::new(),
            content: None,
            image_url: None,
            published: false,
            created_at,
        };
        item.apply_draft(draft);
        item
    }

    fn apply_draft(&mut self, draft: &NewsDraft) {
        self.category = draft.category.trim().to_string();
        self.title = draft.title.trim().to_string();
        self.excerpt = draft.excerpt.trim().to_string();
        self.content = draft.content_opt();
        self.image_url = draft.image_url.clone();
        self.published = draft.published;
    }

    fn set_published(&mut self, published: bool) {
        self.published = published;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NewsDraft {
        NewsDraft {
            category: "Training".into(),
            title: "Women entrepreneurs graduate".into(),
            excerpt: "25 women complete the programme.".into(),
            ..Default::default()
        }
    }

    #[test]
    fn reports_category_before_title() {
        let empty = NewsDraft::default();
        assert_eq!(
            empty.validate(true, false),
            Err(ValidationError("Category is required".into()))
        );
    }

    #[test]
    fn excerpt_limit_is_enforced() {
        let mut d = draft();
        d.excerpt = "x".repeat(501);
        assert_eq!(
            d.validate(true, false),
            Err(ValidationError("Excerpt must be at most 500 characters".into()))
        );
    }

    #[test]
    fn blank_content_is_stored_as_none() {
        let mut d = draft();
        d.content = "   ".into();
        let item = NewsItem::from_draft(Uuid::new_v4(), Utc::now(), &d);
        assert_eq!(item.content, None);
        assert!(!item.published);
    }
}
