//! Authenticated REST calls.
//!
//! Every request carries the session's bearer token. A 401 triggers one
//! refresh (when a refresh token is held) and one retry; if the refresh
//! is rejected the session is dropped and the caller must log in again.

use reqwest::{Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use super::backend::{ApiClient, ApiError};
use crate::domain::{Resource, ResourceDraft};
use crate::session::Session;

/// Role required by the admin surface
pub const ADMIN_ROLE: &str = "admin";

/// Caller identity from `GET /api/auth/me`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: String,
}

impl AdminUser {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// Client for the admin endpoints
#[derive(Debug)]
pub struct AdminClient {
    api: ApiClient,
    /// `None` once logged out or after a rejected refresh
    session: Option<Session>,
}

impl AdminClient {
    pub fn new(api: ApiClient, session: Session) -> Self {
        Self {
            api,
            session: Some(session),
        }
    }

    /// Current session, if still valid
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Give up the session (logout)
    pub fn into_session(self) -> Option<Session> {
        self.session
    }

    /// `GET /api/auth/me`
    pub async fn me(&mut self) -> Result<AdminUser, ApiError> {
        let url = self.api.endpoint(&["api", "auth", "me"])?;
        let response = self.send_authorized(Method::GET, url, None::<&()>).await?;
        self.api.decode(response, "Failed to fetch user").await
    }

    /// Require the caller to hold the admin role
    pub async fn verify_admin(&mut self) -> Result<AdminUser, ApiError> {
        let user = self.me().await?;
        if user.is_admin() {
            Ok(user)
        } else {
            warn!(role = %user.role, "Non-admin user attempted admin access");
            Err(ApiError::Forbidden)
        }
    }

    /// `POST /api/resources`
    pub async fn create_resource(&mut self, draft: &ResourceDraft) -> Result<Resource, ApiError> {
        let url = self.api.endpoint(&["api", "resources"])?;
        let response = self.send_authorized(Method::POST, url, Some(draft)).await?;
        self.api.decode(response, "Failed to create resource").await
    }

    /// `PUT /api/resources/{id}`
    pub async fn update_resource(
        &mut self,
        id: &str,
        draft: &ResourceDraft,
    ) -> Result<Resource, ApiError> {
        let url = self.api.endpoint(&["api", "resources", id])?;
        let response = self.send_authorized(Method::PUT, url, Some(draft)).await?;
        self.api.decode(response, "Failed to update resource").await
    }

    /// `DELETE /api/resources/{id}`
    pub async fn delete_resource(&mut self, id: &str) -> Result<(), ApiError> {
        let url = self.api.endpoint(&["api", "resources", id])?;
        let response = self.send_authorized(Method::DELETE, url, None::<&()>).await?;
        self.api
            .expect_success(response, "Failed to delete resource")
            .await
    }

    /// Bearer request with a single refresh-and-retry on 401
    async fn send_authorized<B: Serialize + ?Sized>(
        &mut self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let token = self.token()?.to_string();
        let response = self.send_once(&method, &url, body, &token).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(%url, "Got 401, attempting token refresh");
        let token = self.refresh().await?;
        let response = self.send_once(&method, &url, body, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.session = None;
            return Err(ApiError::Unauthorized);
        }
        Ok(response)
    }

    async fn send_once<B: Serialize + ?Sized>(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&B>,
        token: &str,
    ) -> Result<Response, ApiError> {
        let mut request = self
            .api
            .http()
            .request(method.clone(), url.clone())
            .bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(|e| self.api.transport(e))
    }

    fn token(&self) -> Result<&str, ApiError> {
        self.session
            .as_ref()
            .map(|s| s.token.as_str())
            .ok_or(ApiError::Unauthorized)
    }

    /// Exchange the refresh token; tears the session down on failure
    async fn refresh(&mut self) -> Result<String, ApiError> {
        let refresh_token = match self.session.as_ref().and_then(|s| s.refresh_token.clone()) {
            Some(token) => token,
            None => {
                self.session = None;
                return Err(ApiError::Unauthorized);
            }
        };

        match self.api.refresh(&refresh_token).await {
            Ok(tokens) => {
                info!("Access token refreshed");
                if let Some(session) = self.session.as_mut() {
                    session.token = tokens.token.clone();
                    if tokens.refresh_token.is_some() {
                        session.refresh_token = tokens.refresh_token;
                    }
                }
                Ok(tokens.token)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, clearing session");
                self.session = None;
                Err(ApiError::Unauthorized)
            }
        }
    }
}
