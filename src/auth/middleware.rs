use actix_session::SessionExt;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    error::ErrorInternalServerError,
    middleware::Next,
    web,
};
use askama::Template;

use crate::auth::{csrf, guard::{GuardState, SessionGuard}, session};
use crate::state::AppState;
use crate::templates_structs::ForbiddenTemplate;

/// Wraps the dashboard scope. Visitors without a session go to `/auth`; signed-in
/// non-supervisors get the access-denied page; supervisors pass through with their
/// `Identity` in the request extensions.
pub async fn require_supervisor(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| ErrorInternalServerError("application state missing"))?;
    let session = req.get_session();

    let outcome = {
        let mut guard = SessionGuard::new(state.stores.roles.as_ref());
        guard.evaluate(session::get_identity(&session)).await.clone()
    };

    match outcome {
        GuardState::Authorized(identity) => {
            req.extensions_mut().insert(identity);
            next.call(req).await.map(|res| res.map_into_left_body())
        }
        GuardState::Forbidden(identity) => {
            log::info!("Dashboard access denied for {} at {}", identity.email, req.path());
            let page = ForbiddenTemplate {
                email: identity.email,
                csrf_token: csrf::token(&session),
            };
            let body = page.render().map_err(ErrorInternalServerError)?;
            let response = HttpResponse::Forbidden()
                .content_type("text/html; charset=utf-8")
                .body(body);
            Ok(req.into_response(response).map_into_right_body())
        }
        GuardState::Unauthenticated | GuardState::Loading => {
            let response = HttpResponse::SeeOther()
                .insert_header(("Location", "/auth"))
                .finish();
            Ok(req.into_response(response).map_into_right_body())
        }
    }
}
