//! JSON-over-HTTP surface for [`BookService`].
//!
//! | Method | Path | Success |
//! |--------|------|---------|
//! | GET    | `/books` | 200, array, `X-Cache: HIT\|MISS` |
//! | GET    | `/book/{id}` | 200 |
//! | POST   | `/book/create` | 201 |
//! | PUT    | `/book/update/{id}` | 200 |
//! | DELETE | `/book/delete/{id}` | 200, `{"status":"deleted","id":N}` |
//! | GET    | `/health` | 200, or 503 when an adapter is down |
//!
//! Handlers only translate between HTTP and service calls. Every failure is
//! rendered by [`ApiError`].

mod error;

pub use error::{ApiError, ErrorBody};

use crate::backend::CacheBackend;
use crate::model::{BookId, BookPatch, NewBook};
use crate::service::BookService;
use crate::store::BookStore;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;

/// Response header naming where a list read was served from.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Build the router. `timeout` bounds each request end to end; a request
/// that exceeds it is answered with 408.
pub fn router<S, B>(service: BookService<S, B>, timeout: Duration) -> Router
where
    S: BookStore,
    B: CacheBackend,
{
    Router::new()
        .route("/books", get(list_books::<S, B>))
        .route("/book/{id}", get(get_book::<S, B>))
        .route("/book/create", post(create_book::<S, B>))
        .route("/book/update/{id}", put(update_book::<S, B>))
        .route("/book/delete/{id}", delete(delete_book::<S, B>))
        .route("/health", get(health::<S, B>))
        .layer(TimeoutLayer::new(timeout))
        .with_state(service)
}

fn parse_id(raw: &str) -> Result<BookId, ApiError> {
    Ok(raw.parse::<BookId>()?)
}

async fn list_books<S: BookStore, B: CacheBackend>(
    State(service): State<BookService<S, B>>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = service.list().await?;
    Ok((
        [(X_CACHE, HeaderValue::from_static(listing.cache.as_str()))],
        Json(listing.books),
    ))
}

async fn get_book<S: BookStore, B: CacheBackend>(
    State(service): State<BookService<S, B>>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&raw_id)?;
    Ok(Json(service.get(id).await?))
}

async fn create_book<S: BookStore, B: CacheBackend>(
    State(service): State<BookService<S, B>>,
    body: Result<Json<NewBook>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(new_book) = body?;
    let book = service.create(new_book).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book<S: BookStore, B: CacheBackend>(
    State(service): State<BookService<S, B>>,
    Path(raw_id): Path<String>,
    body: Result<Json<BookPatch>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&raw_id)?;
    let Json(patch) = body?;
    Ok(Json(service.update(id, patch).await?))
}

async fn delete_book<S: BookStore, B: CacheBackend>(
    State(service): State<BookService<S, B>>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&raw_id)?;
    service.delete(id).await?;
    Ok(Json(json!({ "status": "deleted", "id": id })))
}

async fn health<S: BookStore, B: CacheBackend>(
    State(service): State<BookService<S, B>>,
) -> impl IntoResponse {
    let health = service.health().await;
    let (status, label) = if health.is_healthy() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    (
        status,
        Json(json!({
            "status": label,
            "store": health.store,
            "cache": health.cache,
        })),
    )
}
