use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::validate::{first_error, validate_optional, validate_required};
use crate::models::content::{ContentKind, ContentRecord, Draft, FormFields, ValidationError};
use crate::storage::StoredObject;

/// Format of a `datetime-local` input value.
const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// A row of `events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn date_label(&self) -> String {
        self.event_date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "TBA".to_string())
    }

    pub fn location_label(&self) -> &str {
        self.location.as_deref().unwrap_or("N/A")
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// Parse the accepted event date spellings; dates without a time mean midnight UTC.
pub fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, INPUT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub content: String,
    /// Kept as typed so a rejected submission shows the user's input back.
    pub event_date: String,
    pub location: String,
    pub image_url: Option<String>,
    pub published: bool,
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl EventDraft {
    pub fn event_date_value(&self) -> Option<DateTime<Utc>> {
        parse_event_date(&self.event_date)
    }

    pub fn image(&self) -> &str {
        self.image_url.as_deref().unwrap_or("")
    }
}

impl Draft for EventDraft {
    fn from_fields(fields: &FormFields) -> Self {
        Self {
            title: fields.text("title"),
            description: fields.raw("description").to_string(),
            content: fields.raw("content").to_string(),
            event_date: fields.text("event_date"),
            location: fields.text("location"),
            image_url: fields.optional("image_url"),
            published: fields.flag("published"),
        }
    }

    fn validate(&self, _creating: bool, _pending_upload: bool) -> Result<(), ValidationError> {
        let date_error = (!self.event_date.trim().is_empty() && self.event_date_value().is_none())
            .then(|| "Event date must look like 2024-03-15T18:00".to_string());
        match first_error([
            validate_required(&self.title, "Title", 200),
            validate_optional(&self.description, "Description", 2_000),
            validate_optional(&self.location, "Location", 200),
            date_error,
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

impl ContentRecord for Event {
    type Draft = EventDraft;
    const KIND: ContentKind = ContentKind::Event;

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

    fn to_draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            description: self.description.clone().unwrap_or_default(),
            content: self.content.clone().unwrap_or_default(),
            event_date: self
                .event_date
                .map(|d| d.format(INPUT_FORMAT).to_string())
                .unwrap_or_default(),
            location: self.location.clone().unwrap_or_default(),
            image_url: self.image_url.clone(),
            published: self.published,
        }
    }

    fn from_draft(id: Uuid, created_at: DateTime<Utc>, draft: &EventDraft) -> Self {
        let mut event = Event {
            id,
            title: String::new(),
            description: None,
            content: None,
            event_date: None,
            location: None,
            image_url: None,
            published: false,
            created_at,
        };
        event.apply_draft(draft);
        event
    }

    fn apply_draft(&mut self, draft: &EventDraft) {
        self.title = draft.title.trim().to_string();
        self.description = non_blank(&draft.description);
        self.content = non_blank(&draft.content);
        self.event_date = draft.event_date_value();
        self.location = non_blank(&draft.location);
        self.image_url = draft.image_url.clone();
        self.published = draft.published;
    }

    fn set_published(&mut self, published: bool) {
        self.published = published;
    }
}
