//! Open Graph metadata.
//!
//! Two halves: [`extract_og_tags`] and [`fetch_page_tags`] run inside the
//! proxy server, [`OgProxyClient`] calls that proxy from the resolver.

use std::time::Duration;

use anyhow::{Context, Result};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::ResolveError;

/// Path of the proxy endpoint on the site origin
pub const OG_METADATA_PATH: &str = "/api/og-metadata";

/// Proxy response body. Absent tags are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenGraphTags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Content of `og:{name}`, `property=` form first, then `name=`
fn meta_content(document: &Html, name: &str) -> Option<String> {
    ["property", "name"].iter().find_map(|attr| {
        let selector = Selector::parse(&format!("meta[{}='og:{}']", attr, name)).ok()?;
        document
            .select(&selector)
            .find_map(|el| el.value().attr("content"))
            .map(str::to_string)
            .filter(|content| !content.is_empty())
    })
}

/// Pull `og:title`, `og:description` and `og:image` out of a page
pub fn extract_og_tags(html: &str) -> OpenGraphTags {
    let document = Html::parse_document(html);

    OpenGraphTags {
        title: meta_content(&document, "title"),
        description: meta_content(&document, "description"),
        image: meta_content(&document, "image"),
    }
}

/// Fetch a page and extract its tags (server side).
///
/// Non-success statuses are failures.
pub async fn fetch_page_tags(client: &reqwest::Client, url: &str) -> Result<OpenGraphTags> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("HTTP request failed for {}", url))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("HTTP {} for {}", status, url);
    }

    let html = response
        .text()
        .await
        .context("Failed to read response body")?;

    Ok(extract_og_tags(&html))
}

/// Client for a site's `/api/og-metadata` proxy
#[derive(Debug, Clone)]
pub struct OgProxyClient {
    site_url: String,
    client: reqwest::Client,
}

impl OgProxyClient {
    pub fn new(site_url: impl Into<String>, timeout: Duration) -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ResolveError::Request)?;

        Ok(Self {
            site_url: site_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Proxy URL for a target page
    pub fn proxy_url(&self, target: &str) -> Result<Url, ResolveError> {
        let base = format!("{}{}", self.site_url, OG_METADATA_PATH);
        Url::parse_with_params(&base, &[("url", target)])
            .map_err(|e| ResolveError::InvalidUrl(format!("{}: {}", base, e)))
    }

    /// Tags of `target` as seen by the proxy
    pub async fn fetch(&self, target: &str) -> Result<OpenGraphTags, ResolveError> {
        let url = self.proxy_url(target)?;
        debug!(%url, "Fetching Open Graph metadata");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
