use actix_web::{HttpResponse, middleware::from_fn, web};

use crate::auth::middleware::require_supervisor;
use crate::errors::NOT_FOUND_PAGE;
use crate::handlers::{auth_handlers, content_handlers, dashboard, public};
use crate::models::{Event, NewsItem, Resource};

/// Every application route. Static files and `/storage` are mounted by the binary.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Public routes
        .route("/", web::get().to(public::home))
        .route("/auth", web::get().to(auth_handlers::login_page))
        .route("/auth/login", web::post().to(auth_handlers::login_submit))
        .route("/auth/signup", web::post().to(auth_handlers::signup_submit))
        .route("/logout", web::post().to(auth_handlers::logout))
        // Supervisor dashboard
        .service(
            web::scope("/dashboard")
                .wrap(from_fn(require_supervisor))
                .route("", web::get().to(dashboard::index))
                .route("/analytics", web::get().to(dashboard::analytics))
                .configure(content_handlers::configure::<NewsItem>)
                .configure(content_handlers::configure::<Event>)
                .configure(content_handlers::configure::<Resource>),
        );
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body(NOT_FOUND_PAGE)
}
