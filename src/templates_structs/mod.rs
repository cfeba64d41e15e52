// Template context structures for askama templates, organized by page family.

use actix_session::Session;

use crate::auth::csrf;
use crate::auth::session::{Notice, take_notice};
use crate::config::AppConfig;
use crate::dashboard::Tab;
use crate::models::account::Identity;

mod dashboard;
mod public;

pub use dashboard::*;
pub use public::*;

pub struct TabLink {
    pub label: &'static str,
    pub path: &'static str,
    pub active: bool,
}

/// Common context shared by all dashboard pages.
/// Templates access these as `ctx.email`, `ctx.tabs`, etc.
pub struct PageContext {
    pub email: String,
    pub csrf_token: String,
    pub notice: Option<Notice>,
    pub tabs: Vec<TabLink>,
    pub analytics_url: String,
}

impl PageContext {
    /// Consumes the pending notice, so build it once per rendered page.
    pub fn build(session: &Session, identity: &Identity, active: Tab, config: &AppConfig) -> Self {
        let tabs = Tab::ALL
            .iter()
            .map(|tab| TabLink { label: tab.label(), path: tab.path(), active: *tab == active })
            .collect();
        Self {
            email: identity.email.clone(),
            csrf_token: csrf::token(session),
            notice: take_notice(session),
            tabs,
            analytics_url: config.analytics_url.clone(),
        }
    }
}
