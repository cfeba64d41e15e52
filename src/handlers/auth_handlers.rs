use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;

use crate::auth::events::SessionChange;
use crate::auth::session::{self, Notice};
use crate::auth::validate::{first_error, validate_email, validate_password};
use crate::auth::{csrf, password};
use crate::errors::{AppError, render, see_other};
use crate::models::account::{Identity, NewAccount, normalize_email};
use crate::state::AppState;
use crate::templates_structs::AuthTemplate;

#[derive(Deserialize)]
pub struct CredentialsForm {
    pub email: String,
    pub password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

fn auth_page(session: &Session, email: &str, login_error: Option<String>, signup_error: Option<String>) -> Result<HttpResponse, AppError> {
    let tmpl = AuthTemplate {
        csrf_token: csrf::token(session),
        login_error,
        signup_error,
        notice: session::take_notice(session),
        email: email.to_string(),
    };
    render(tmpl)
}

fn start_session(state: &AppState, session: &Session, identity: Identity) -> Result<HttpResponse, AppError> {
    session::sign_in(session, &identity)?;
    state.sessions.publish(SessionChange::SignedIn {
        user_id: identity.user_id,
        email: identity.email,
    });
    Ok(see_other("/dashboard"))
}

pub async fn login_page(session: Session) -> Result<HttpResponse, AppError> {
    if session::get_identity(&session).is_some() {
        return Ok(see_other("/dashboard"));
    }
    auth_page(&session, "", None, None)
}

pub async fn login_submit(
    req: HttpRequest,
    state: web::Data<AppState>,
    session: Session,
    form: web::Form<CredentialsForm>,
) -> Result<HttpResponse, AppError> {
    csrf::verify(&session, &form.csrf_token)?;

    // Rate-limit check before any store access
    let ip = req
        .peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED));
    if state.limiter.is_blocked(ip) {
        log::warn!("Sign-in blocked for {ip}: too many failures");
        return auth_page(
            &session,
            &form.email,
            Some("Too many failed sign-in attempts. Please try again later.".to_string()),
            None,
        );
    }

    let email = normalize_email(&form.email);
    let account = match state.stores.accounts.find_by_email(&email).await {
        Ok(account) => account,
        Err(e) => {
            log::error!("Account lookup failed: {e}");
            return auth_page(&session, &form.email, Some(e.to_string()), None);
        }
    };

    match account {
        Some(account) if password::verify_password(&form.password, &account.password_hash)? => {
            state.limiter.clear(ip);
            let identity = Identity { user_id: account.id, email: account.email };
            start_session(&state, &session, identity)
        }
        _ => {
            state.limiter.record_failure(ip);
            auth_page(&session, &form.email, Some("Invalid email or password".to_string()), None)
        }
    }
}

/// New accounts hold no role; a supervisor grant happens outside this app.
pub async fn signup_submit(
    state: web::Data<AppState>,
    session: Session,
    form: web::Form<CredentialsForm>,
) -> Result<HttpResponse, AppError> {
    csrf::verify(&session, &form.csrf_token)?;

    let email = normalize_email(&form.email);
    if let Some(msg) = first_error([validate_email(&email), validate_password(&form.password)]) {
        return auth_page(&session, "", None, Some(msg));
    }

    match state.stores.accounts.find_by_email(&email).await {
        Ok(Some(_)) => {
            return auth_page(&session, "", None, Some("An account with this email already exists".to_string()));
        }
        Ok(None) => {}
        Err(e) => return auth_page(&session, "", None, Some(e.to_string())),
    }

    let password_hash = password::hash_password(&form.password)?;
    let account = match state.stores.accounts.create(&NewAccount { email, password_hash }).await {
        Ok(account) => account,
        Err(e) => {
            log::error!("Account creation failed: {e}");
            return auth_page(&session, "", None, Some(e.to_string()));
        }
    };
    log::info!("Account created for {}", account.email);

    let identity = Identity { user_id: account.id, email: account.email };
    start_session(&state, &session, identity)
}

pub async fn logout(
    state: web::Data<AppState>,
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::verify(&session, &form.csrf_token)?;
    if let Some(identity) = session::get_identity(&session) {
        state.sessions.publish(SessionChange::SignedOut { user_id: identity.user_id });
    }
    // Cleared rather than purged so the notice survives into the next page.
    session.clear();
    session.renew();
    session::set_notice(&session, Notice::success("You have been signed out"));
    Ok(see_other("/"))
}
