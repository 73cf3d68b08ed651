//! YouTube Data API v3 video lookups.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::ResolveError;

/// Public video information endpoint
pub const VIDEOS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";

/// Thumbnail URL for a video id; no request needed
pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{}/hqdefault.jpg", video_id)
}

/// Title and description of one video
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct VideoSnippet {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    #[serde(default)]
    snippet: Option<VideoSnippet>,
}

/// Client for the videos endpoint
#[derive(Debug, Clone)]
pub struct YoutubeClient {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl YoutubeClient {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ResolveError::Request)?;

        Ok(Self {
            endpoint: VIDEOS_ENDPOINT.to_string(),
            api_key,
            client,
        })
    }

    /// Point at a different endpoint (stub servers)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Snippet of the first matching video, `None` when the id is unknown
    pub async fn snippet(&self, video_id: &str) -> Result<Option<VideoSnippet>, ResolveError> {
        let api_key = self.api_key.as_deref().ok_or(ResolveError::MissingApiKey)?;

        debug!(video_id, "Fetching YouTube snippet");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("part", "snippet"), ("id", video_id), ("key", api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let list: VideoListResponse = serde_json::from_slice(&body)?;

        Ok(list.items.into_iter().next().and_then(|item| item.snippet))
    }
}
