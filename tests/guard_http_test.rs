//! Session Guard tests: the role check itself and every way into `/dashboard`.
//!
//! A non-supervisor must only ever see the access-denied page, whatever
//! dashboard path they ask for.

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;

use inmed_site::auth::guard::{GuardState, SessionGuard};
use inmed_site::models::account::Identity;
use inmed_site::models::role::SUPERVISOR;
use inmed_site::models::NewsItem;
use inmed_site::store::{ListQuery, MemoryStore, RecordStore, RoleStore};

use common::*;

const DASHBOARD_PATHS: &[&str] = &[
    "/dashboard",
    "/dashboard/news",
    "/dashboard/events",
    "/dashboard/resources",
    "/dashboard/analytics",
    "/dashboard/news?edit=00000000-0000-0000-0000-000000000000",
];

// ============================================================================
// GUARD STATE MACHINE
// ============================================================================

#[actix_rt::test]
async fn test_guard_states() {
    let store = MemoryStore::new();
    let supervisor = add_account(&store, SUPERVISOR_EMAIL, SUPERVISOR_PASS, true).await;
    let visitor = add_account(&store, VISITOR_EMAIL, VISITOR_PASS, false).await;

    let mut guard = SessionGuard::new(&store);
    assert_eq!(guard.state(), &GuardState::Loading);

    assert_eq!(guard.evaluate(None).await, &GuardState::Unauthenticated);

    let sup = Identity { user_id: supervisor, email: SUPERVISOR_EMAIL.to_string() };
    assert_eq!(guard.evaluate(Some(sup.clone())).await, &GuardState::Authorized(sup));

    let vis = Identity { user_id: visitor, email: VISITOR_EMAIL.to_string() };
    assert_eq!(guard.evaluate(Some(vis.clone())).await, &GuardState::Forbidden(vis));
}

#[actix_rt::test]
async fn test_failed_role_query_is_forbidden() {
    let store = MemoryStore::new();
    let supervisor = add_account(&store, SUPERVISOR_EMAIL, SUPERVISOR_PASS, true).await;
    store.fail_next_read("role lookup timed out").await;

    let mut guard = SessionGuard::new(&store);
    let identity = Identity { user_id: supervisor, email: SUPERVISOR_EMAIL.to_string() };
    assert_eq!(guard.evaluate(Some(identity.clone())).await, &GuardState::Forbidden(identity));
}

// ============================================================================
// HTTP
// ============================================================================

#[actix_rt::test]
async fn test_anonymous_visitor_is_sent_to_sign_in() {
    let h = harness();
    let app = test_app!(h.state);
    let client = Client::new();

    for path in DASHBOARD_PATHS {
        let resp = test::call_service(&app, client.get(path).to_request()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&resp), "/auth", "{path}");
    }
}

#[actix_rt::test]
async fn test_non_supervisor_only_sees_forbidden_view() {
    let h = harness();
    add_account(&h.store, VISITOR_EMAIL, VISITOR_PASS, false).await;
    let app = test_app!(h.state);
    let mut client = Client::new();

    let resp = sign_in!(app, client, VISITOR_EMAIL, VISITOR_PASS);
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    for path in DASHBOARD_PATHS {
        let resp = test::call_service(&app, client.get(path).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{path}");
        let body = body_text(resp).await;
        assert!(body.contains("Access Denied"), "{path}");
        assert!(body.contains("Go Home"));
        assert!(body.contains("action=\"/logout\""));
        assert!(!body.contains("class=\"tabs\""), "{path} leaked the dashboard shell");
        assert!(!body.contains("Create News item"), "{path} leaked a manager form");
    }
}

#[actix_rt::test]
async fn test_non_supervisor_cannot_mutate() {
    let h = harness();
    add_account(&h.store, VISITOR_EMAIL, VISITOR_PASS, false).await;
    let app = test_app!(h.state);
    let mut client = Client::new();
    sign_in!(app, client, VISITOR_EMAIL, VISITOR_PASS);
    let calls_before = h.store.calls();

    let req = client
        .post_multipart(
            "/dashboard/news",
            &[("category", "Health"), ("title", "Sneaky"), ("excerpt", "x"), ("csrf_token", "x")],
            None,
        )
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    // The role check is the only store call; nothing was written.
    assert_eq!(h.store.calls(), calls_before + 1);
    let items: Vec<NewsItem> = h.state.stores.news.list(ListQuery::newest_first()).await.expect("list failed");
    assert!(items.is_empty());
}

#[actix_rt::test]
async fn test_role_granted_later_applies_on_next_request() {
    let h = harness();
    let visitor = add_account(&h.store, VISITOR_EMAIL, VISITOR_PASS, false).await;
    let app = test_app!(h.state);
    let mut client = Client::new();
    sign_in!(app, client, VISITOR_EMAIL, VISITOR_PASS);

    let resp = test::call_service(&app, client.get("/dashboard/news").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    h.store.grant_role(visitor, SUPERVISOR).await.expect("grant failed");

    let resp = test::call_service(&app, client.get("/dashboard/news").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Supervisor Dashboard"));
}

#[actix_rt::test]
async fn test_supervisor_sees_all_tabs() {
    let h = harness();
    add_account(&h.store, SUPERVISOR_EMAIL, SUPERVISOR_PASS, true).await;
    let app = test_app!(h.state);
    let mut client = Client::new();

    let resp = sign_in!(app, client, SUPERVISOR_EMAIL, SUPERVISOR_PASS);
    assert_eq!(location(&resp), "/dashboard");

    let resp = test::call_service(&app, client.get("/dashboard").to_request()).await;
    assert_eq!(location(&resp), "/dashboard/news");

    let resp = test::call_service(&app, client.get("/dashboard/news").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    client.track(&resp);
    let body = body_text(resp).await;
    for tab in ["News", "Events", "Resources", "Analytics"] {
        assert!(body.contains(&format!(">{tab}</a>")), "missing tab {tab}");
    }
}
