//! Category Loader Integration Tests
//!
//! Runs the loader against a stub REST API on an ephemeral port.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use dunamis::loader::view::{EMPTY_MESSAGE, RETRY_HINT};
use dunamis::{ApiClient, ApiError, Category, CategoryLoader, CategoryView};

const SERMON_COUNT: u32 = 20;

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: u32,
    limit: u32,
}

#[derive(Clone, Default)]
struct Recorded {
    queries: Arc<Mutex<Vec<String>>>,
}

fn sermon(n: u32) -> Value {
    json!({
        "_id": format!("sermon-{}", n),
        "title": format!("Sermon {}", n),
        "description": "A message of hope",
        "imageUrl": "/placeholder.svg?height=400&width=600",
        "externalLink": format!("https://youtu.be/sermon{:05}", n),
        "category": "sermon",
        "featured": n == 1,
        "authorId": { "_id": "u1", "name": "Pastor John" },
        "createdAt": "2024-03-01T10:00:00Z",
    })
}

fn paginate(total: u32, page: u32, limit: u32) -> Value {
    let total_pages = total.div_ceil(limit);
    let start = (page - 1) * limit;
    let docs: Vec<Value> = (start..total.min(start + limit)).map(|i| sermon(i + 1)).collect();

    json!({
        "docs": docs,
        "totalDocs": total,
        "limit": limit,
        "totalPages": total_pages,
        "page": page,
        "pagingCounter": start + 1,
        "hasPrevPage": page > 1,
        "hasNextPage": page < total_pages,
        "prevPage": if page > 1 { Some(page - 1) } else { None },
        "nextPage": if page < total_pages { Some(page + 1) } else { None },
    })
}

async fn by_category(
    State(recorded): State<Recorded>,
    Path(category): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    recorded
        .queries
        .lock()
        .unwrap()
        .push(format!("{}?page={}&limit={}", category, query.page, query.limit));

    match category.as_str() {
        "sermon" => Json(paginate(SERMON_COUNT, query.page, query.limit)).into_response(),
        "book" => Json(json!({
            "docs": [],
            "totalDocs": 0,
            "limit": query.limit,
            "totalPages": 0,
            "page": query.page,
            "hasPrevPage": false,
            "hasNextPage": false,
            "prevPage": null,
            "nextPage": null,
        }))
        .into_response(),
        "worship" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Database unavailable" })),
        )
            .into_response(),
        "movie" => (StatusCode::INTERNAL_SERVER_ERROR, "oops").into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_backend() -> (String, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/api/resources/category/:category", get(by_category))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), recorded)
}

fn loader(base_url: &str) -> CategoryLoader {
    CategoryLoader::new(ApiClient::new(base_url, Duration::from_secs(5)).unwrap())
}

#[tokio::test]
async fn test_loads_requested_page() {
    let (base_url, recorded) = spawn_backend().await;
    let loader = loader(&base_url);

    let page = loader.load(Category::Sermon, 2).await.unwrap();

    assert_eq!(page.page, 2);
    assert_eq!(page.limit, 9);
    assert!(page.docs.len() <= page.limit as usize);
    assert_eq!(page.docs.len(), 9);
    assert_eq!(page.docs[0].id, "sermon-10");
    assert_eq!(page.total_pages, 3);
    assert!(page.has_prev_page && page.has_next_page);
    assert_eq!(page.docs[0].author_name(), Some("Pastor John"));

    assert_eq!(
        recorded.queries.lock().unwrap().as_slice(),
        ["sermon?page=2&limit=9"]
    );
}

#[tokio::test]
async fn test_last_page_is_partial() {
    let (base_url, _) = spawn_backend().await;
    let page = loader(&base_url)
        .with_page_size(6)
        .load(Category::Sermon, 4)
        .await
        .unwrap();

    assert_eq!(page.page, 4);
    assert_eq!(page.docs.len(), 2);
    assert!(!page.has_next_page);
    assert_eq!(page.next_page, None);
}

#[tokio::test]
async fn test_empty_category_is_not_an_error() {
    let (base_url, _) = spawn_backend().await;
    let view = loader(&base_url).view(Category::Book, 1).await;

    assert_eq!(view, CategoryView::Empty);
    let text = view.render(Category::Book);
    assert!(text.contains(EMPTY_MESSAGE));
    assert!(!text.contains(RETRY_HINT));
}

#[tokio::test]
async fn test_server_message_shown_verbatim() {
    let (base_url, _) = spawn_backend().await;
    let err = loader(&base_url).load(Category::Worship, 1).await.unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 500, .. }));
    assert_eq!(err.to_string(), "Database unavailable");

    let view = CategoryView::from_result(Err(err));
    assert!(view
        .render(Category::Worship)
        .contains("Database unavailable\nPlease try again later."));
}

#[tokio::test]
async fn test_status_reason_without_message() {
    let (base_url, _) = spawn_backend().await;
    let err = loader(&base_url).load(Category::Movie, 1).await.unwrap_err();

    assert_eq!(err.to_string(), "Internal Server Error");
}

#[tokio::test]
async fn test_zero_page_rejected_without_request() {
    let (base_url, recorded) = spawn_backend().await;
    let err = loader(&base_url).load(Category::Sermon, 0).await.unwrap_err();

    assert!(matches!(err, ApiError::InvalidRequest(_)));
    assert!(recorded.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // Bind and drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = loader(&format!("http://{}", addr))
        .load(Category::Sermon, 1)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)));
}
