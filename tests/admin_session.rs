//! Admin Session Integration Tests
//!
//! Login, token refresh and authenticated CRUD against a stub REST API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;

use dunamis::adapters::{AdminClient, ApiClient, ApiError};
use dunamis::domain::{Category, ResourceDraft};
use dunamis::session::{Session, SessionStore};

const REFRESH_TOKEN: &str = "refresh-1";
const USER_TOKEN: &str = "user-token";

#[derive(Clone)]
struct Backend {
    /// Currently valid admin access token
    access: Arc<Mutex<String>>,
    refreshes: Arc<AtomicUsize>,
    created: Arc<Mutex<Vec<Value>>>,
}

impl Backend {
    fn new() -> Self {
        Self {
            access: Arc::new(Mutex::new("token-1".to_string())),
            refreshes: Arc::new(AtomicUsize::new(0)),
            created: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Role of the bearer, `None` when the token is not valid
    fn role(&self, headers: &HeaderMap) -> Option<&'static str> {
        let token = headers
            .get("authorization")?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;

        if token == *self.access.lock().unwrap() {
            Some("admin")
        } else if token == USER_TOKEN {
            Some("user")
        } else {
            None
        }
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Token expired" })),
    )
        .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] == "admin@example.com" && body["password"] == "password" {
        Json(json!({ "token": "token-1", "refreshToken": REFRESH_TOKEN })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid email or password" })),
        )
            .into_response()
    }
}

async fn refresh(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    backend.refreshes.fetch_add(1, Ordering::SeqCst);
    if body["refreshToken"] != REFRESH_TOKEN {
        return unauthorized();
    }

    let token = format!("token-{}", backend.refreshes.load(Ordering::SeqCst) + 1);
    *backend.access.lock().unwrap() = token.clone();
    Json(json!({ "token": token })).into_response()
}

async fn me(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    match backend.role(&headers) {
        Some(role) => Json(json!({
            "_id": "u1",
            "name": "Pastor John",
            "email": "admin@example.com",
            "role": role,
        }))
        .into_response(),
        None => unauthorized(),
    }
}

fn stored(id: &str, draft: &Value) -> Value {
    let mut resource = draft.clone();
    resource["_id"] = json!(id);
    resource["createdAt"] = json!("2024-03-01T10:00:00Z");
    resource
}

async fn create(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(draft): Json<Value>,
) -> Response {
    if backend.role(&headers) != Some("admin") {
        return unauthorized();
    }
    let mut created = backend.created.lock().unwrap();
    created.push(draft.clone());
    let id = format!("res-{}", created.len());
    (StatusCode::CREATED, Json(stored(&id, &draft))).into_response()
}

async fn update(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(draft): Json<Value>,
) -> Response {
    if backend.role(&headers) != Some("admin") {
        return unauthorized();
    }
    if id == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Resource not found" })),
        )
            .into_response();
    }
    Json(stored(&id, &draft)).into_response()
}

async fn delete(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if backend.role(&headers) != Some("admin") {
        return unauthorized();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::new();
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/me", get(me))
        .route("/api/resources", post(create))
        .route("/api/resources/:id", put(update).delete(delete))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), backend)
}

fn api(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, Duration::from_secs(5)).unwrap()
}

fn draft() -> ResourceDraft {
    let mut draft = ResourceDraft::new(Category::Sermon).with_link("https://youtu.be/dQw4w9WgXcQ");
    draft.title = "Walking in Faith".to_string();
    draft.description = "Sunday message".to_string();
    draft
}

#[tokio::test]
async fn test_login_and_verify_admin() {
    let (base_url, _) = spawn_backend().await;
    let api = api(&base_url);

    let tokens = api.login("admin@example.com", "password").await.unwrap();
    assert_eq!(tokens.token, "token-1");
    assert_eq!(tokens.refresh_token.as_deref(), Some(REFRESH_TOKEN));

    let mut admin = AdminClient::new(
        api,
        Session::new(tokens.token, tokens.refresh_token, "admin@example.com"),
    );
    let user = admin.verify_admin().await.unwrap();
    assert_eq!(user.name.as_deref(), Some("Pastor John"));
    assert!(user.is_admin());
}

#[tokio::test]
async fn test_bad_credentials_show_server_message() {
    let (base_url, _) = spawn_backend().await;
    let err = api(&base_url)
        .login("admin@example.com", "wrong")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 401, .. }));
    assert_eq!(err.to_string(), "Invalid email or password");
}

#[tokio::test]
async fn test_expired_token_refreshed_once() {
    let (base_url, backend) = spawn_backend().await;
    let mut admin = AdminClient::new(
        api(&base_url),
        Session::new("expired", Some(REFRESH_TOKEN.to_string()), "admin@example.com"),
    );

    let created = admin.create_resource(&draft()).await.unwrap();

    assert_eq!(created.id, "res-1");
    assert_eq!(created.title, "Walking in Faith");
    assert_eq!(created.category, Category::Sermon);
    assert_eq!(backend.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(admin.session().unwrap().token, "token-2");
    // refresh token kept when the backend does not rotate it
    assert_eq!(
        admin.session().unwrap().refresh_token.as_deref(),
        Some(REFRESH_TOKEN)
    );

    let body = backend.created.lock().unwrap()[0].clone();
    assert_eq!(body["externalLink"], "https://youtu.be/dQw4w9WgXcQ");
    assert_eq!(body["imageUrl"], "/placeholder.svg?height=400&width=600");
}

#[tokio::test]
async fn test_rejected_refresh_tears_down_session() {
    let (base_url, backend) = spawn_backend().await;
    let mut admin = AdminClient::new(
        api(&base_url),
        Session::new("expired", Some("revoked".to_string()), "admin@example.com"),
    );

    let err = admin.me().await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert!(admin.session().is_none());
    assert_eq!(backend.refreshes.load(Ordering::SeqCst), 1);

    // no session left, so nothing further is sent
    assert!(matches!(admin.me().await, Err(ApiError::Unauthorized)));
    assert_eq!(backend.refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_401_without_refresh_token() {
    let (base_url, backend) = spawn_backend().await;
    let mut admin = AdminClient::new(
        api(&base_url),
        Session::new("expired", None, "admin@example.com"),
    );

    assert!(matches!(admin.me().await, Err(ApiError::Unauthorized)));
    assert!(admin.session().is_none());
    assert_eq!(backend.refreshes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_non_admin_is_forbidden() {
    let (base_url, _) = spawn_backend().await;
    let mut admin = AdminClient::new(api(&base_url), Session::new(USER_TOKEN, None, "user@example.com"));

    assert!(matches!(admin.verify_admin().await, Err(ApiError::Forbidden)));
}

#[tokio::test]
async fn test_update_and_delete() {
    let (base_url, _) = spawn_backend().await;
    let mut admin = AdminClient::new(
        api(&base_url),
        Session::new("token-1", Some(REFRESH_TOKEN.to_string()), "admin@example.com"),
    );

    let mut changed = draft();
    changed.featured = true;
    let updated = admin.update_resource("res-7", &changed).await.unwrap();
    assert_eq!(updated.id, "res-7");
    assert!(updated.featured);

    let err = admin.update_resource("missing", &changed).await.unwrap_err();
    assert_eq!(err.to_string(), "Resource not found");
    assert_eq!(err.status(), Some(404));

    admin.delete_resource("res-7").await.unwrap();
}

#[tokio::test]
async fn test_refreshed_session_survives_store_round_trip() {
    let (base_url, _) = spawn_backend().await;
    let temp = TempDir::new().unwrap();
    let store = SessionStore::in_home(temp.path());

    store
        .save(&Session::new("expired", Some(REFRESH_TOKEN.to_string()), "admin@example.com"))
        .await
        .unwrap();

    let session = store.load().await.unwrap().unwrap();
    let mut admin = AdminClient::new(api(&base_url), session);
    admin.me().await.unwrap();
    store.save(admin.session().unwrap()).await.unwrap();

    let reloaded = store.load().await.unwrap().unwrap();
    assert_eq!(reloaded.token, "token-2");
    assert_eq!(reloaded.email, "admin@example.com");
}
