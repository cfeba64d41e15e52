use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};

use crate::dashboard::{Tab, analytics};
use crate::errors::{AppError, render, see_other};
use crate::handlers::current_identity;
use crate::state::AppState;
use crate::templates_structs::{AnalyticsTemplate, PageContext};

/// `/dashboard` opens on the News tab.
pub async fn index() -> HttpResponse {
    see_other(Tab::News.path())
}

pub async fn analytics(
    req: HttpRequest,
    state: web::Data<AppState>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let identity = current_identity(&req)?;
    let ctx = PageContext::build(&session, &identity, Tab::Analytics, &state.config);

    let (report, load_error) = match analytics::load(state.stores.donations.as_ref()).await {
        Ok(report) => (report, None),
        Err(e) => {
            log::error!("Loading donations failed: {e}");
            (analytics::DonationReport::empty(), Some(e.to_string()))
        }
    };

    render(AnalyticsTemplate { ctx, report, load_error })
}
