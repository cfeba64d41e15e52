use actix_web::{HttpResponse, http::StatusCode};
use askama::Template;
use uuid::Uuid;

use super::PageContext;
use crate::auth::session::Notice;
use crate::dashboard::analytics::DonationReport;
use crate::dashboard::manager::FormMode;
use crate::errors::{AppError, render_with_status};
use crate::models::{
    ContentKind, ContentRecord, Event, EventDraft, NewsDraft, NewsItem, Resource, ResourceCategory,
    ResourceDraft,
};
use crate::store::Collection;

/// Where the tab form posts and what its heading says.
pub struct FormView {
    pub action: String,
    pub heading: String,
    pub submit_label: &'static str,
    pub editing: bool,
    pub error: Option<Notice>,
}

impl FormView {
    pub fn new<D>(kind: ContentKind, mode: &FormMode<D>, error: Option<Notice>) -> Self {
        match mode {
            FormMode::Creating(_) => Self {
                action: kind.dashboard_path(),
                heading: format!("Create {}", kind.singular()),
                submit_label: "Create",
                editing: false,
                error,
            },
            FormMode::Editing { id, .. } => Self {
                action: format!("{}/{id}", kind.dashboard_path()),
                heading: format!("Edit {}", kind.singular()),
                submit_label: "Update",
                editing: true,
                error,
            },
        }
    }
}

fn into_draft<D>(mode: FormMode<D>) -> D {
    match mode {
        FormMode::Creating(draft) | FormMode::Editing { draft, .. } => draft,
    }
}

/// A content collection that has a dashboard tab page.
pub trait TabView: Collection {
    fn render_tab(
        status: StatusCode,
        ctx: PageContext,
        items: Vec<Self>,
        mode: FormMode<Self::Draft>,
        form_error: Option<Notice>,
    ) -> Result<HttpResponse, AppError>;
}

#[derive(Template)]
#[template(path = "dashboard/news.html")]
pub struct NewsTabTemplate {
    pub ctx: PageContext,
    pub items: Vec<NewsItem>,
    pub form: FormView,
    pub draft: NewsDraft,
}

impl TabView for NewsItem {
    fn render_tab(
        status: StatusCode,
        ctx: PageContext,
        items: Vec<Self>,
        mode: FormMode<NewsDraft>,
        form_error: Option<Notice>,
    ) -> Result<HttpResponse, AppError> {
        let form = FormView::new(Self::KIND, &mode, form_error);
        render_with_status(status, NewsTabTemplate { ctx, items, form, draft: into_draft(mode) })
    }
}

#[derive(Template)]
#[template(path = "dashboard/events.html")]
pub struct EventsTabTemplate {
    pub ctx: PageContext,
    pub items: Vec<Event>,
    pub form: FormView,
    pub draft: EventDraft,
}

impl TabView for Event {
    fn render_tab(
        status: StatusCode,
        ctx: PageContext,
        items: Vec<Self>,
        mode: FormMode<EventDraft>,
        form_error: Option<Notice>,
    ) -> Result<HttpResponse, AppError> {
        let form = FormView::new(Self::KIND, &mode, form_error);
        render_with_status(status, EventsTabTemplate { ctx, items, form, draft: into_draft(mode) })
    }
}

#[derive(Template)]
#[template(path = "dashboard/resources.html")]
pub struct ResourcesTabTemplate {
    pub ctx: PageContext,
    pub items: Vec<Resource>,
    pub form: FormView,
    pub draft: ResourceDraft,
    pub categories: Vec<ResourceCategory>,
}

impl TabView for Resource {
    fn render_tab(
        status: StatusCode,
        ctx: PageContext,
        items: Vec<Self>,
        mode: FormMode<ResourceDraft>,
        form_error: Option<Notice>,
    ) -> Result<HttpResponse, AppError> {
        let form = FormView::new(Self::KIND, &mode, form_error);
        render_with_status(
            status,
            ResourcesTabTemplate {
                ctx,
                items,
                form,
                draft: into_draft(mode),
                categories: ResourceCategory::ALL.to_vec(),
            },
        )
    }
}

#[derive(Template)]
#[template(path = "dashboard/confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub ctx: PageContext,
    pub singular: &'static str,
    pub title: String,
    pub action: String,
    pub cancel_path: String,
}

impl ConfirmDeleteTemplate {
    pub fn new(ctx: PageContext, kind: ContentKind, id: Uuid, title: String) -> Self {
        Self {
            ctx,
            singular: kind.singular(),
            title,
            action: format!("{}/{id}/delete", kind.dashboard_path()),
            cancel_path: kind.dashboard_path(),
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard/analytics.html")]
pub struct AnalyticsTemplate {
    pub ctx: PageContext,
    pub report: DonationReport,
    pub load_error: Option<String>,
}
