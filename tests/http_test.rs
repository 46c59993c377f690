//! Integration tests for the HTTP front end.
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tempfile::TempDir;
use tower::ServiceExt;
use triage_rs::engine::Engine;
use triage_rs::http::{AppState, create_router};
use triage_rs::model::{ItemId, Stage};
use triage_rs::storage::StageStore;

fn id(n: u64) -> ItemId {
    ItemId::new(n).unwrap()
}

async fn setup(review: &[(u64, &str)]) -> (TempDir, Engine, Router) {
    let tmp = tempfile::tempdir().unwrap();
    let store = StageStore::new(tmp.path());
    store.ensure_layout().await.unwrap();
    for (n, body) in review {
        std::fs::write(tmp.path().join("review").join(n.to_string()), body).unwrap();
    }
    let (engine, processor) = Engine::bootstrap(store, 8).await.unwrap();
    processor.spawn();
    let router = create_router(AppState::new(engine.clone()));
    (tmp, engine, router)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = router
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, location, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn flush(engine: &Engine) {
    tokio::time::timeout(Duration::from_secs(5), engine.flush())
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn root_redirects_to_a_pending_item() {
    let (_tmp, _engine, router) = setup(&[(42, "answer")]).await;

    let (status, location, _) = get(&router, "/").await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(location.as_deref(), Some("/view/42"));
}

#[tokio::test]
async fn root_with_empty_review_says_so() {
    let (_tmp, _engine, router) = setup(&[]).await;

    let (status, location, body) = get(&router, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(location.is_none());
    assert!(body.contains("Nothing left to review"));
}

#[tokio::test]
async fn view_renders_escaped_content() {
    let (_tmp, _engine, router) = setup(&[(7, "<b>bold</b> claim")]).await;

    let (status, _, body) = get(&router, "/view/7").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("&lt;b&gt;bold&lt;/b&gt; claim"));
    assert!(body.contains("/accept/7"));
    assert!(body.contains("/reject/7"));
}

#[tokio::test]
async fn view_of_unknown_or_malformed_id_is_404() {
    let (_tmp, _engine, router) = setup(&[(7, "x")]).await;

    assert_eq!(get(&router, "/view/8").await.0, StatusCode::NOT_FOUND);
    assert_eq!(get(&router, "/view/abc").await.0, StatusCode::NOT_FOUND);
    assert_eq!(get(&router, "/view/0").await.0, StatusCode::NOT_FOUND);
    assert_eq!(get(&router, "/accept/-1").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn accept_queues_move_and_redirects() {
    let (tmp, engine, router) = setup(&[(1, "one"), (2, "two")]).await;

    let (status, location, _) = get(&router, "/accept/1").await;
    assert_eq!(status, StatusCode::FOUND);
    // The move may not have landed yet, so either item can be suggested.
    let location = location.unwrap();
    assert!(location == "/view/1" || location == "/view/2", "{location}");

    flush(&engine).await;
    assert!(engine.contains(Stage::Accept, id(1)));
    assert!(tmp.path().join("accept/1").exists());
    assert_eq!(get(&router, "/view/1").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reject_of_last_item_redirects_home() {
    let (tmp, engine, router) = setup(&[(3, "three")]).await;

    get(&router, "/reject/3").await;
    flush(&engine).await;
    assert!(tmp.path().join("reject/3").exists());

    let (status, location, _) = get(&router, "/reject/3").await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(location.as_deref(), Some("/"));
    flush(&engine).await;
    assert_eq!(engine.index().stage_of(id(3)), Some(Stage::Reject));
}

#[tokio::test]
async fn exit_signals_shutdown() {
    let (_tmp, engine, router) = setup(&[(1, "one")]).await;

    let (status, _, body) = get(&router, "/exit").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Terminating server...");
    assert!(engine.is_shutting_down());
}

#[tokio::test]
async fn run_server_returns_after_shutdown() {
    let (_tmp, engine, _router) = setup(&[]).await;

    let server = tokio::spawn(triage_rs::http::run_server("127.0.0.1:0", engine.clone()));
    engine.shutdown();

    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();
}
