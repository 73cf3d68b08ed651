//! Adapter interfaces for external systems.
//!
//! - backend: the resource hub REST API (public endpoints)
//! - admin: authenticated REST endpoints with token refresh
//! - youtube: YouTube Data API video snippets
//! - opengraph: Open Graph tag extraction and the site proxy client
//!
//! Link resolution goes through the [`MetadataFetcher`] trait so the
//! resolver can run against fakes.

pub mod admin;
pub mod backend;
pub mod opengraph;
pub mod youtube;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ResolvedConfig;

pub use admin::{AdminClient, AdminUser};
pub use backend::{ApiClient, ApiError, LoginResponse, ResourceQuery};
pub use opengraph::{OgProxyClient, OpenGraphTags};
pub use youtube::{VideoSnippet, YoutubeClient};

/// Failure of a provider lookup.
///
/// An unrecognized link is not an error; the resolver returns `None`.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("YouTube API key is not configured (set DUNAMIS_YOUTUBE_API_KEY)")]
    MissingApiKey,

    #[error("Metadata request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Metadata service returned HTTP {0}")]
    Status(u16),

    #[error("Failed to parse metadata response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Metadata lookup timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Provider lookups used by the link resolver
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    /// Snippet of a video, `None` when the provider has no such video
    async fn video_snippet(&self, video_id: &str) -> Result<Option<VideoSnippet>, ResolveError>;

    /// Open Graph tags of an arbitrary page
    async fn open_graph(&self, url: &str) -> Result<OpenGraphTags, ResolveError>;
}

/// Production fetcher: YouTube API plus the site's Open Graph proxy
#[derive(Debug, Clone)]
pub struct HttpMetadataFetcher {
    youtube: YoutubeClient,
    og: OgProxyClient,
}

impl HttpMetadataFetcher {
    pub fn new(youtube: YoutubeClient, og: OgProxyClient) -> Self {
        Self { youtube, og }
    }

    /// Build both clients from resolved configuration
    pub fn from_config(config: &ResolvedConfig) -> Result<Self, ResolveError> {
        Ok(Self::new(
            YoutubeClient::new(config.youtube_api_key.clone(), config.request_timeout)?,
            OgProxyClient::new(&config.site_url, config.request_timeout)?,
        ))
    }
}

#[async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
    async fn video_snippet(&self, video_id: &str) -> Result<Option<VideoSnippet>, ResolveError> {
        self.youtube.snippet(video_id).await
    }

    async fn open_graph(&self, url: &str) -> Result<OpenGraphTags, ResolveError> {
        self.og.fetch(url).await
    }
}
