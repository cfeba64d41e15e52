use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::{csrf, session};
use crate::errors::{AppError, render};
use crate::models::ContentRecord;
use crate::state::AppState;
use crate::store::{ListQuery, RecordStore};
use crate::templates_structs::HomeTemplate;

const HOME_LIMIT: i64 = 3;

/// Newest published records of one collection. A failing store leaves the
/// section empty rather than failing the page.
async fn published<T: ContentRecord>(store: &dyn RecordStore<T>) -> Vec<T> {
    match store.list(ListQuery::published(HOME_LIMIT)).await {
        Ok(rows) => rows,
        Err(e) => {
            log::error!("Loading published {} failed: {e}", T::KIND);
            Vec::new()
        }
    }
}

pub async fn home(state: web::Data<AppState>, session: Session) -> Result<HttpResponse, AppError> {
    let stores = &state.stores;
    let news = published(stores.news.as_ref()).await;
    let events = published(stores.events.as_ref()).await;
    let resources = published(stores.resources.as_ref()).await;

    let tmpl = HomeTemplate {
        news,
        events,
        resources,
        notice: session::take_notice(&session),
        signed_in: session::get_identity(&session).is_some(),
        csrf_token: csrf::token(&session),
    };
    render(tmpl)
}
