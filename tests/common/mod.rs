//! Shared test infrastructure.
//!
//! Everything runs against the in-process backends (`MemoryStore`,
//! `MemoryStorage`), so no database or network is needed.
//!
//! # HTTP tests
//! - `harness()` - fresh stores, storage and app state
//! - `test_app!(state)` - the full route table behind a cookie session
//! - `Client` - carries the session cookie between requests
//! - `sign_in!(app, client, email, password)` - CSRF + login round trip
//! - `send!(app, client, request)` - one request, cookie tracked

#![allow(dead_code, unused_macros)]

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::test::{self, TestRequest};
use actix_web::web;
use regex::Regex;
use uuid::Uuid;

use inmed_site::auth::password;
use inmed_site::config::AppConfig;
use inmed_site::models::account::NewAccount;
use inmed_site::models::role::SUPERVISOR;
use inmed_site::state::AppState;
use inmed_site::storage::{MemoryStorage, ObjectStorage};
use inmed_site::store::{AccountStore, MemoryStore, RoleStore, Stores};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const SUPERVISOR_EMAIL: &str = "supervisor@inmed.test";
pub const SUPERVISOR_PASS: &str = "supervisor-pass";
pub const VISITOR_EMAIL: &str = "visitor@inmed.test";
pub const VISITOR_PASS: &str = "visitor-pass";

const SESSION_COOKIE: &str = "id";
const BOUNDARY: &str = "----inmed-test-boundary";

// ============================================================================
// STATE SETUP
// ============================================================================

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub storage: Arc<MemoryStorage>,
    pub state: web::Data<AppState>,
}

pub fn harness() -> Harness {
    harness_with(AppConfig::default())
}

pub fn harness_with(config: AppConfig) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let storage = Arc::new(MemoryStorage::new());
    let object_storage: Arc<dyn ObjectStorage> = storage.clone();
    let state = web::Data::new(AppState::new(Stores::memory(store.clone()), object_storage, config));
    Harness { store, storage, state }
}

/// Create an account directly in the store, optionally holding the supervisor role.
pub async fn add_account(store: &MemoryStore, email: &str, pass: &str, supervisor: bool) -> Uuid {
    let password_hash = password::hash_password(pass).expect("Failed to hash password");
    let account = store
        .create(&NewAccount { email: email.to_string(), password_hash })
        .await
        .expect("Failed to create account");
    if supervisor {
        store
            .grant_role(account.id, SUPERVISOR)
            .await
            .expect("Failed to grant role");
    }
    account.id
}

pub fn session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::from(&[7u8; 64]))
        .cookie_secure(false)
        .build()
}

/// Build the application service from an `AppState`.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(common::session_middleware())
                .app_data($state.clone())
                .configure(inmed_site::routes::configure)
                .default_service(actix_web::web::to(inmed_site::routes::not_found)),
        )
        .await
    };
}

/// Sign in through the real login form. Evaluates to the login response.
macro_rules! sign_in {
    ($app:expr, $client:expr, $email:expr, $pass:expr) => {{
        let resp = actix_web::test::call_service(&$app, $client.get("/auth").to_request()).await;
        $client.track(&resp);
        let token = common::csrf_token(&common::body_text(resp).await);
        let req = $client
            .post("/auth/login")
            .set_form([("email", $email), ("password", $pass), ("csrf_token", token.as_str())])
            .to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        $client.track(&resp);
        resp
    }};
}

/// Send a request and keep its cookie. Evaluates to `(status, location, body)`.
macro_rules! send {
    ($app:expr, $client:expr, $req:expr) => {{
        let resp = actix_web::test::call_service(&$app, $req.to_request()).await;
        $client.track(&resp);
        let status = resp.status();
        let location = common::location(&resp);
        (status, location, common::body_text(resp).await)
    }};
}

// ============================================================================
// HTTP CLIENT
// ============================================================================

/// Remembers the session cookie the way a browser would.
#[derive(Default)]
pub struct Client {
    cookie: Option<Cookie<'static>>,
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, uri: &str) -> TestRequest {
        self.with_cookie(TestRequest::get().uri(uri))
    }

    pub fn post(&self, uri: &str) -> TestRequest {
        self.with_cookie(TestRequest::post().uri(uri))
    }

    /// A multipart POST with text fields and an optional `file` part.
    pub fn post_multipart(&self, uri: &str, fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> TestRequest {
        let files: Vec<(&str, &str, &[u8])> = file.into_iter().map(|(name, bytes)| ("file", name, bytes)).collect();
        self.post_multipart_parts(uri, fields, &files)
    }

    /// A multipart POST with file parts given as `(part name, file name, bytes)`.
    pub fn post_multipart_parts(&self, uri: &str, fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> TestRequest {
        let (content_type, body) = multipart_body(fields, files);
        self.post(uri)
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
    }

    fn with_cookie(&self, req: TestRequest) -> TestRequest {
        match &self.cookie {
            Some(cookie) => req.cookie(cookie.clone()),
            None => req,
        }
    }

    /// Pick up a new or removed session cookie from a response.
    pub fn track<B>(&mut self, resp: &ServiceResponse<B>) {
        for cookie in resp.response().cookies() {
            if cookie.name() == SESSION_COOKIE {
                if cookie.value().is_empty() {
                    self.cookie = None;
                } else {
                    self.cookie = Some(cookie.into_owned());
                }
            }
        }
    }
}

// ============================================================================
// RESPONSE HELPERS
// ============================================================================

pub async fn body_text<B: MessageBody>(resp: ServiceResponse<B>) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// The CSRF token embedded in a rendered form.
pub fn csrf_token(html: &str) -> String {
    let re = Regex::new(r#"name="csrf_token" value="([0-9a-f]{64})""#).expect("Bad regex");
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .expect("No CSRF token in page")
}

pub fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    for (part, file_name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{part}\"; filename=\"{file_name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
