use askama::Template;

use crate::auth::session::Notice;
use crate::models::{Event, NewsItem, Resource};

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub news: Vec<NewsItem>,
    pub events: Vec<Event>,
    pub resources: Vec<Resource>,
    pub notice: Option<Notice>,
    pub signed_in: bool,
    pub csrf_token: String,
}

/// Sign-in and sign-up side by side. `email` refills whichever form was submitted.
#[derive(Template)]
#[template(path = "auth.html")]
pub struct AuthTemplate {
    pub csrf_token: String,
    pub login_error: Option<String>,
    pub signup_error: Option<String>,
    pub notice: Option<Notice>,
    pub email: String,
}

#[derive(Template)]
#[template(path = "forbidden.html")]
pub struct ForbiddenTemplate {
    pub email: String,
    pub csrf_token: String,
}
