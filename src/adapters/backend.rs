//! Client for the resource hub REST API.
//!
//! Endpoints (all relative to the configured API origin):
//!
//! | Method | Path                                         | Auth   |
//! |--------|----------------------------------------------|--------|
//! | GET    | /api/resources/category/{category}?page&limit | public |
//! | GET    | /api/resources/featured                      | public |
//! | GET    | /api/resources?page&limit&category           | public |
//! | GET    | /api/resources/{id}                          | public |
//! | POST   | /api/auth/login                              | public |
//! | POST   | /api/auth/refresh                            | public |
//!
//! Authenticated endpoints live on [`super::admin::AdminClient`].

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ResolvedConfig;
use crate::domain::{Category, Paginated, Resource};

/// Message used when the backend gives no usable error text
pub const GENERIC_FETCH_FAILURE: &str = "Failed to fetch resources";

/// Errors from the REST API.
///
/// `Display` is the user-facing message; a `Status` error shows the
/// server's `message` verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Session expired. Please log in again.")]
    Unauthorized,

    #[error("Access denied: admin role required")]
    Forbidden,

    #[error("Failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// HTTP status, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Unauthorized => Some(401),
            ApiError::Forbidden => Some(403),
            _ => None,
        }
    }
}

/// Failure body shape: `{ "message": "..." }`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Pick the message for a non-success response.
///
/// Order: body `message`, then the status reason phrase, then `fallback`.
pub fn status_message(status: StatusCode, body: &[u8], fallback: &str) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| fallback.to_string())
}

/// Filters for the general listing endpoint
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// Tokens returned by a successful login or refresh
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Public REST API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// API origin, without trailing slash
    base_url: String,
    /// Timeout applied to every request
    timeout: Duration,
    /// HTTP client
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            client,
        })
    }

    /// Create from resolved configuration
    pub fn from_config(config: &ResolvedConfig) -> Result<Self, ApiError> {
        Self::new(&config.api_url, config.request_timeout)
    }

    /// The configured API origin
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// Build `{base}/{segments...}`, percent-encoding each segment
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("bad API URL {}: {}", self.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest(format!("bad API URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// URL of one category page.
    ///
    /// Pages past the end are passed through; only zero is rejected.
    pub fn category_url(&self, category: Category, page: u32, limit: u32) -> Result<Url, ApiError> {
        if page == 0 {
            return Err(ApiError::InvalidRequest("page must be at least 1".to_string()));
        }
        if limit == 0 {
            return Err(ApiError::InvalidRequest("limit must be at least 1".to_string()));
        }

        let mut url = self.endpoint(&["api", "resources", "category", category.as_api_str()])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());
        Ok(url)
    }

    /// Fetch one page of resources in a category
    #[instrument(skip(self), fields(category = %category))]
    pub async fn resources_by_category(
        &self,
        category: Category,
        page: u32,
        limit: u32,
    ) -> Result<Paginated<Resource>, ApiError> {
        let url = self.category_url(category, page, limit)?;
        debug!(%url, "Fetching category page");
        self.execute(self.client.get(url), GENERIC_FETCH_FAILURE).await
    }

    /// Fetch featured resources for the landing page
    pub async fn featured(&self) -> Result<Vec<Resource>, ApiError> {
        let url = self.endpoint(&["api", "resources", "featured"])?;
        debug!(%url, "Fetching featured resources");
        self.execute(self.client.get(url), GENERIC_FETCH_FAILURE).await
    }

    /// Fetch a page of the general listing
    pub async fn list_resources(&self, query: &ResourceQuery) -> Result<Paginated<Resource>, ApiError> {
        let url = self.endpoint(&["api", "resources"])?;
        debug!(%url, ?query, "Listing resources");
        self.execute(self.client.get(url).query(query), GENERIC_FETCH_FAILURE)
            .await
    }

    /// Fetch one resource by id
    pub async fn get_resource(&self, id: &str) -> Result<Resource, ApiError> {
        let url = self.endpoint(&["api", "resources", id])?;
        self.execute(self.client.get(url), "Failed to fetch resource")
            .await
    }

    /// Exchange credentials for a token pair
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint(&["api", "auth", "login"])?;
        let request = self.client.post(url).json(&serde_json::json!({
            "email": email,
            "password": password,
        }));
        self.execute(request, "Login failed").await
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint(&["api", "auth", "refresh"])?;
        let request = self.client.post(url).json(&serde_json::json!({
            "refreshToken": refresh_token,
        }));
        self.execute(request, "Token refresh failed").await
    }

    /// Send a request and decode a JSON success body
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| self.transport(e))?;
        self.decode(response, fallback).await
    }

    /// Decode a response, turning non-success statuses into `ApiError::Status`
    pub(crate) async fn decode<T: DeserializeOwned>(
        &self,
        response: Response,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport(e))?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: status_message(status, &body, fallback),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }

    /// Like `decode` for endpoints whose success body is irrelevant
    pub(crate) async fn expect_success(&self, response: Response, fallback: &str) -> Result<(), ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.bytes().await.map_err(|e| self.transport(e))?;
        Err(ApiError::Status {
            status: status.as_u16(),
            message: status_message(status, &body, fallback),
        })
    }

    /// Classify a reqwest failure
    pub(crate) fn transport(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout(self.timeout)
        } else {
            ApiError::Transport(error)
        }
    }
}
