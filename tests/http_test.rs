//! HTTP surface tests: routes, status codes, headers and error bodies.

#![cfg(feature = "inmemory")]

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use bookcache::backend::InMemoryBackend;
use bookcache::http::{router, X_CACHE};
use bookcache::store::InMemoryStore;
use bookcache::{BookService, CacheReadPolicy, ServiceConfig};
use common::{init_logging, CountingStore, FlakyBackend};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

const TIMEOUT: Duration = Duration::from_secs(5);

fn app() -> Router {
    init_logging();
    let service = BookService::new(
        InMemoryStore::new(),
        InMemoryBackend::new(),
        ServiceConfig::default(),
    );
    router(service, TIMEOUT)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    app.clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

async fn send_raw(app: &Router, method: Method, uri: &str, body: &'static str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .expect("request should build");
    app.clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

fn cache_header(response: &Response) -> &str {
    response
        .headers()
        .get(X_CACHE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

#[tokio::test]
async fn test_crud_round_trip() {
    let app = app();

    let created = send(
        &app,
        Method::POST,
        "/book/create",
        Some(json!({"title": "Dune", "author": "Herbert"})),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let book = json_body(created).await;
    assert_eq!(book["id"], 1);
    assert_eq!(book["title"], "Dune");
    assert_eq!(book["published_at"], Value::Null);
    assert!(book["created_at"].is_string());

    let miss = send(&app, Method::GET, "/books", None).await;
    assert_eq!(miss.status(), StatusCode::OK);
    assert_eq!(cache_header(&miss), "MISS");
    let list = json_body(miss).await;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(list[0]["title"], "Dune");

    let hit = send(&app, Method::GET, "/books", None).await;
    assert_eq!(cache_header(&hit), "HIT");

    let updated = send(
        &app,
        Method::PUT,
        "/book/update/1",
        Some(json!({"title": "Dune Messiah"})),
    )
    .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let book = json_body(updated).await;
    assert_eq!(book["title"], "Dune Messiah");
    assert_eq!(book["author"], "Herbert");

    let fetched = send(&app, Method::GET, "/book/1", None).await;
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(json_body(fetched).await["title"], "Dune Messiah");

    let deleted = send(&app, Method::DELETE, "/book/delete/1", None).await;
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(
        json_body(deleted).await,
        json!({"status": "deleted", "id": 1})
    );

    let gone = send(&app, Method::GET, "/book/1", None).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    let body = json_body(gone).await;
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "Book 1 not found");
}

#[tokio::test]
async fn test_empty_store_lists_empty_array() {
    let app = app();
    let response = send(&app, Method::GET, "/books", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn test_bad_ids_are_client_errors() {
    let app = app();

    for (method, uri) in [
        (Method::GET, "/book/abc"),
        (Method::GET, "/book/0"),
        (Method::GET, "/book/-4"),
        (Method::DELETE, "/book/delete/x"),
    ] {
        let response = send(&app, method, uri, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(json_body(response).await["error"], "client_input");
    }

    let response = send(
        &app,
        Method::PUT,
        "/book/update/nope",
        Some(json!({"title": "x"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_body_is_client_error() {
    let app = app();

    let response = send_raw(&app, Method::POST, "/book/create", "{not json").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "client_input");
    assert!(body["message"].is_string());

    let response = send_raw(&app, Method::POST, "/book/create", r#"{"title": "Dune"}"#).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_missing_book_is_not_found() {
    let app = app();
    let response = send(
        &app,
        Method::PUT,
        "/book/update/7",
        Some(json!({"title": "x"})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_missing_book_succeeds() {
    let app = app();
    let response = send(&app, Method::DELETE, "/book/delete/7", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["id"], 7);
}

#[tokio::test]
async fn test_cache_failure_is_server_error_under_fail_fast() {
    init_logging();
    let backend = FlakyBackend::new();
    let service = BookService::new(
        CountingStore::new(),
        backend.clone(),
        ServiceConfig::default().with_cache_read_policy(CacheReadPolicy::FailFast),
    );
    let app = router(service, TIMEOUT);
    backend.fail_reads(true);

    let response = send(&app, Method::GET, "/books", None).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "cache");
}

#[tokio::test]
async fn test_health_endpoint() {
    init_logging();
    let backend = FlakyBackend::new();
    let service = BookService::new(CountingStore::new(), backend.clone(), ServiceConfig::default());
    let app = router(service, TIMEOUT);

    let healthy = send(&app, Method::GET, "/health", None).await;
    assert_eq!(healthy.status(), StatusCode::OK);
    assert_eq!(
        json_body(healthy).await,
        json!({"status": "ok", "store": true, "cache": true})
    );

    backend.fail_reads(true);
    let degraded = send(&app, Method::GET, "/health", None).await;
    assert_eq!(degraded.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(degraded).await["cache"], false);
}
