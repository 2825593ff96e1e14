//! Auth, dashboard and lecture flows against the mock backend.

use std::sync::Arc;

use skolamat::backend::dto::SessionResponse;
use skolamat::backend::mock::MockApi;
use skolamat::error::AppError;
use skolamat::models::{Problemset, Role};
use skolamat::services::{AuthService, Dashboard};
use skolamat::session::SessionStore;

fn session_response(user_id: i64) -> SessionResponse {
    SessionResponse {
        access_token: "tok-123".to_string(),
        user_id,
        role: Role::Lecturer,
    }
}

fn problemset(id: i64, title: &str) -> Problemset {
    Problemset {
        id,
        title: title.to_string(),
        kind: None,
        part_of: None,
        group_name: None,
        raw_latex: None,
        finalized: true,
        problems: Vec::new(),
    }
}

#[tokio::test]
async fn test_login_stores_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = SessionStore::open(dir.path()).expect("store");
    let api = Arc::new(MockApi::new().with_session(session_response(5)));
    let auth = AuthService::new(api);

    let session = auth
        .login(&mut store, "ana@skola.hr", "lozinka123")
        .await
        .expect("login");

    assert_eq!(session.user_id, 5);
    assert_eq!(store.session().map(|s| s.token.as_str()), Some("tok-123"));
}

#[tokio::test]
async fn test_failed_login_leaves_store_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = SessionStore::open(dir.path()).expect("store");
    // No session fixture configured, so credentials are rejected.
    let api = Arc::new(MockApi::new());
    let auth = AuthService::new(api);

    let result = auth.login(&mut store, "ana@skola.hr", "kriva").await;

    assert!(matches!(result, Err(AppError::Api { status: 400, .. })));
    assert!(store.session().is_none());
}

#[tokio::test]
async fn test_blank_credentials_rejected_locally() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = SessionStore::open(dir.path()).expect("store");
    let api = Arc::new(MockApi::new().with_session(session_response(1)));
    let auth = AuthService::new(api.clone());

    let result = auth.login(&mut store, "", "").await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(api.call_count("login"), 0);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = SessionStore::open(dir.path()).expect("store");
    let api = Arc::new(MockApi::new().with_session(session_response(2)));
    let auth = AuthService::new(api);

    auth.login(&mut store, "a@b.c", "pw123456")
        .await
        .expect("login");
    auth.logout(&mut store).expect("logout");

    assert!(store.session().is_none());
}

#[tokio::test]
async fn test_invite_acceptance_validates_password_first() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = SessionStore::open(dir.path()).expect("store");
    let api = Arc::new(MockApi::new().with_session(session_response(3)));
    let auth = AuthService::new(api.clone());

    let result = auth.accept_invite(&mut store, "inv-1", "kratka", "kratka").await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(api.call_count("accept_invite"), 0);

    auth.accept_invite(&mut store, "inv-1", "dovoljnoduga", "dovoljnoduga")
        .await
        .expect("accept");
    assert_eq!(store.session().map(|s| s.user_id), Some(3));
}

#[tokio::test]
async fn test_open_lecture_records_recent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = SessionStore::open(dir.path()).expect("store");
    let api = Arc::new(MockApi::new().with_session(session_response(1)));
    AuthService::new(api.clone())
        .login(&mut store, "a@b.c", "pw123456")
        .await
        .expect("login");

    api.problemsets
        .lock()
        .expect("lock")
        .extend([problemset(10, "Limesi"), problemset(11, "Nizovi")]);

    let dash = Dashboard::new(api);
    dash.open_lecture(&mut store, 10).await.expect("open");
    dash.open_lecture(&mut store, 11).await.expect("open");
    dash.open_lecture(&mut store, 10).await.expect("reopen");

    assert_eq!(store.recent_lectures(), vec![10, 11]);
}

#[tokio::test]
async fn test_recent_skips_deleted_problemsets() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = SessionStore::open(dir.path()).expect("store");
    let api = Arc::new(MockApi::new().with_session(session_response(1)));
    AuthService::new(api.clone())
        .login(&mut store, "a@b.c", "pw123456")
        .await
        .expect("login");

    api.problemsets.lock().expect("lock").push(problemset(20, "Ostaje"));
    let dash = Dashboard::new(api.clone());
    dash.open_lecture(&mut store, 20).await.expect("open");
    // A recent id whose problemset no longer exists on the backend.
    store.record_recent(999).expect("record");

    let recent = dash.recent(&store).await;
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, 20);
}

#[tokio::test]
async fn test_problem_search_falls_back_to_listing() {
    let api = Arc::new(MockApi::new());
    let dash = Dashboard::new(api.clone());

    dash.search_problems("  ").await.expect("listing");
    assert_eq!(api.call_count("problems_with_lecture"), 1);
    assert_eq!(api.call_count("search_problems"), 0);

    dash.search_problems("integral").await.expect("search");
    assert_eq!(api.call_count("search_problems"), 1);
}
