//! Account tests: password hashing, sign-up, sign-in, rate limiting and
//! sign-out, plus the public home page.

#[macro_use]
mod common;

use actix_web::http::StatusCode;

use inmed_site::auth::password::{hash_password, verify_password};
use inmed_site::models::NewsDraft;
use inmed_site::store::{AccountStore, RecordStore, RoleStore};

use common::*;

// ============================================================================
// PASSWORDS
// ============================================================================

#[test]
fn test_password_hash_and_verify() {
    let hash = hash_password("correct horse").expect("Failed to hash");
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("correct horse", &hash).expect("verify failed"));
    assert!(!verify_password("wrong horse", &hash).expect("verify failed"));
}

#[test]
fn test_same_password_hashes_differently() {
    let a = hash_password("repeatable").expect("Failed to hash");
    let b = hash_password("repeatable").expect("Failed to hash");
    assert_ne!(a, b);
}

// ============================================================================
// SIGN UP
// ============================================================================

#[actix_rt::test]
async fn test_signup_creates_account_without_dashboard_access() {
    let h = harness();
    let app = test_app!(h.state);
    let mut client = Client::new();

    let (_, _, body) = send!(app, client, client.get("/auth"));
    let token = csrf_token(&body);
    let (status, location, _) = send!(
        app,
        client,
        client.post("/auth/signup").set_form([
            ("email", " New.Person@Example.org "),
            ("password", "long-enough"),
            ("csrf_token", token.as_str()),
        ])
    );
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location, "/dashboard");

    let account = h
        .store
        .find_by_email("new.person@example.org")
        .await
        .expect("lookup failed")
        .expect("account missing");
    assert!(!h.store.has_role(account.id, "supervisor").await.expect("role lookup failed"));

    let (status, _, body) = send!(app, client, client.get("/dashboard"));
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("new.person@example.org"));
}

#[actix_rt::test]
async fn test_signup_rejects_duplicate_and_short_password() {
    let h = harness();
    add_account(&h.store, VISITOR_EMAIL, VISITOR_PASS, false).await;
    let app = test_app!(h.state);
    let mut client = Client::new();
    let (_, _, body) = send!(app, client, client.get("/auth"));
    let token = csrf_token(&body);

    let (status, _, body) = send!(
        app,
        client,
        client.post("/auth/signup").set_form([
            ("email", VISITOR_EMAIL),
            ("password", "another-pass"),
            ("csrf_token", token.as_str()),
        ])
    );
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("An account with this email already exists"));

    let (_, _, body) = send!(
        app,
        client,
        client.post("/auth/signup").set_form([
            ("email", "short@inmed.test"),
            ("password", "short"),
            ("csrf_token", token.as_str()),
        ])
    );
    assert!(body.contains("Password must be at least 8 characters"));
    assert!(h.store.find_by_email("short@inmed.test").await.expect("lookup failed").is_none());
}

// ============================================================================
// SIGN IN / OUT
// ============================================================================

#[actix_rt::test]
async fn test_wrong_password_is_generic() {
    let h = harness();
    add_account(&h.store, SUPERVISOR_EMAIL, SUPERVISOR_PASS, true).await;
    let app = test_app!(h.state);
    let mut client = Client::new();

    let resp = sign_in!(app, client, SUPERVISOR_EMAIL, "not-the-password");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Invalid email or password"));
    assert!(body.contains(&format!("value=\"{SUPERVISOR_EMAIL}\"")));

    let resp = sign_in!(app, client, "nobody@inmed.test", SUPERVISOR_PASS);
    assert!(body_text(resp).await.contains("Invalid email or password"));
}

#[actix_rt::test]
async fn test_repeated_failures_are_rate_limited() {
    let h = harness();
    add_account(&h.store, SUPERVISOR_EMAIL, SUPERVISOR_PASS, true).await;
    let app = test_app!(h.state);
    let mut client = Client::new();

    for _ in 0..5 {
        let resp = sign_in!(app, client, SUPERVISOR_EMAIL, "guessing");
        assert!(body_text(resp).await.contains("Invalid email or password"));
    }

    // Even the right password is refused while blocked.
    let resp = sign_in!(app, client, SUPERVISOR_EMAIL, SUPERVISOR_PASS);
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Too many failed sign-in attempts"));
}

#[actix_rt::test]
async fn test_signed_in_user_skips_auth_page() {
    let h = harness();
    add_account(&h.store, SUPERVISOR_EMAIL, SUPERVISOR_PASS, true).await;
    let app = test_app!(h.state);
    let mut client = Client::new();
    sign_in!(app, client, SUPERVISOR_EMAIL, SUPERVISOR_PASS);

    let (status, location, _) = send!(app, client, client.get("/auth"));
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location, "/dashboard");
}

#[actix_rt::test]
async fn test_logout_ends_session() {
    let h = harness();
    add_account(&h.store, SUPERVISOR_EMAIL, SUPERVISOR_PASS, true).await;
    let app = test_app!(h.state);
    let mut client = Client::new();
    sign_in!(app, client, SUPERVISOR_EMAIL, SUPERVISOR_PASS);
    let (_, _, body) = send!(app, client, client.get("/dashboard/news"));
    let token = csrf_token(&body);

    let (status, location, _) = send!(app, client, client.post("/logout").set_form([("csrf_token", token.as_str())]));
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location, "/");

    let (_, _, home) = send!(app, client, client.get("/"));
    assert!(home.contains("You have been signed out"));
    assert!(home.contains("Sign In"));

    let (status, location, _) = send!(app, client, client.get("/dashboard/news"));
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location, "/auth");
}

// ============================================================================
// HOME PAGE
// ============================================================================

fn news(title: &str, published: bool) -> NewsDraft {
    NewsDraft {
        category: "Health".to_string(),
        title: title.to_string(),
        excerpt: "Summary".to_string(),
        published,
        ..NewsDraft::default()
    }
}

#[actix_rt::test]
async fn test_home_lists_only_published_records() {
    let h = harness();
    for title in ["Story one", "Story two", "Story three", "Story four"] {
        h.state.stores.news.insert(&news(title, true)).await.expect("insert failed");
    }
    h.state.stores.news.insert(&news("Unreleased draft", false)).await.expect("insert failed");
    let app = test_app!(h.state);
    let mut client = Client::new();

    let (status, _, body) = send!(app, client, client.get("/"));
    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("Unreleased draft"));
    assert_eq!(body.matches("class=\"news-card\"").count(), 3);
}

#[actix_rt::test]
async fn test_home_survives_store_failure() {
    let h = harness();
    h.store.fail_next_read("connection reset").await;
    let app = test_app!(h.state);
    let mut client = Client::new();

    let (status, _, body) = send!(app, client, client.get("/"));
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("INMED South Africa"));
}

#[actix_rt::test]
async fn test_unknown_path_is_not_found() {
    let h = harness();
    let app = test_app!(h.state);
    let mut client = Client::new();

    let (status, _, _) = send!(app, client, client.get("/no-such-page"));
    assert_eq!(status, StatusCode::NOT_FOUND);
}
