//! Open Graph proxy server.
//!
//! Fetches third-party pages server side so the resolver never makes
//! cross-origin page requests itself.
//!
//! Routes:
//! - `GET /api/og-metadata?url=...` -> `{ title, description, image }`
//! - `GET /health` -> `ok`

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::adapters::opengraph::{fetch_page_tags, OG_METADATA_PATH};

/// Shared state for the handlers
#[derive(Debug, Clone)]
pub struct ProxyState {
    client: reqwest::Client,
}

impl ProxyState {
    /// Upstream fetches are bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[derive(Debug, Deserialize)]
struct OgQuery {
    url: Option<String>,
}

async fn og_metadata(State(state): State<Arc<ProxyState>>, Query(query): Query<OgQuery>) -> Response {
    let Some(url) = query.url.filter(|u| !u.trim().is_empty()) else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Missing URL" }))).into_response();
    };

    match fetch_page_tags(&state.client, &url).await {
        Ok(tags) => (StatusCode::OK, Json(tags)).into_response(),
        Err(e) => {
            warn!(%url, error = %e, "Open Graph fetch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch metadata" })),
            )
                .into_response()
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

/// Build the proxy router
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route(OG_METADATA_PATH, get(og_metadata))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Bind and serve until the process is stopped
pub async fn serve(address: &str, state: ProxyState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;

    info!("Open Graph proxy listening on {}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}
