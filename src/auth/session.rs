use actix_session::Session;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::account::Identity;

const USER_ID_KEY: &str = "user_id";
const EMAIL_KEY: &str = "email";
const NOTICE_KEY: &str = "notice";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient message shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, title: "Success".to_string(), message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, title: "Error".to_string(), message: message.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, title: "Validation Error".to_string(), message: message.into() }
    }

    pub fn css_class(&self) -> &'static str {
        match self.kind {
            NoticeKind::Success => "notice notice-success",
            NoticeKind::Error => "notice notice-error",
        }
    }
}

pub fn get_identity(session: &Session) -> Option<Identity> {
    let user_id = session.get::<Uuid>(USER_ID_KEY).unwrap_or(None)?;
    let email = session.get::<String>(EMAIL_KEY).unwrap_or(None)?;
    Some(Identity { user_id, email })
}

/// Start a fresh session for `identity`. The session id is renewed to avoid fixation.
pub fn sign_in(session: &Session, identity: &Identity) -> Result<(), AppError> {
    session.renew();
    session
        .insert(USER_ID_KEY, identity.user_id)
        .and_then(|_| session.insert(EMAIL_KEY, &identity.email))
        .map_err(|e| AppError::Session(e.to_string()))
}

pub fn set_notice(session: &Session, notice: Notice) {
    if let Err(e) = session.insert(NOTICE_KEY, &notice) {
        log::warn!("Could not store notice: {e}");
    }
}

pub fn take_notice(session: &Session) -> Option<Notice> {
    let notice = session.get::<Notice>(NOTICE_KEY).unwrap_or(None);
    if notice.is_some() {
        session.remove(NOTICE_KEY);
    }
    notice
}
