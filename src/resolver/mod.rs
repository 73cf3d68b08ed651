//! Link metadata resolution.
//!
//! Turns a pasted link into a [`LinkMetadata`] for pre-filling an admin
//! draft:
//!
//! 1. [`LinkProvider::classify`] picks the provider (no I/O)
//! 2. videos go to the YouTube API, audio and book links to the Open
//!    Graph proxy
//! 3. provider fallbacks fill whatever the page left out
//!
//! [`LinkPrefill`] sits on top and makes sure only the latest lookup
//! touches the draft.

pub mod prefill;
pub mod provider;

use std::time::Duration;

use tracing::{debug, instrument};

use crate::adapters::youtube::thumbnail_url;
use crate::adapters::{MetadataFetcher, OpenGraphTags};
use crate::domain::LinkMetadata;

pub use crate::adapters::ResolveError;
pub use prefill::{LinkPrefill, PendingPrefill, PrefillOutcome, MANUAL_ENTRY_MESSAGE};
pub use provider::{extract_video_id, LinkProvider};

/// Image used when an Open Graph page has none
pub const FALLBACK_IMAGE: &str = "/placeholder.svg";

/// Resolves links through a [`MetadataFetcher`]
#[derive(Debug, Clone)]
pub struct LinkResolver<F> {
    fetcher: F,
    timeout: Duration,
}

impl<F: MetadataFetcher> LinkResolver<F> {
    /// Create a resolver; every lookup is bounded by `timeout`
    pub fn new(fetcher: F, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Resolve a link.
    ///
    /// `Ok(None)` for blank input, unrecognized providers and unknown
    /// videos; none of those touch the network except the last.
    #[instrument(skip(self))]
    pub async fn resolve(&self, link: &str) -> Result<Option<LinkMetadata>, ResolveError> {
        let Some(provider) = LinkProvider::classify(link) else {
            debug!("No provider for link");
            return Ok(None);
        };

        debug!(%provider, "Classified link");
        tokio::time::timeout(self.timeout, self.fetch(link.trim(), &provider))
            .await
            .map_err(|_| ResolveError::Timeout(self.timeout))?
    }

    async fn fetch(
        &self,
        link: &str,
        provider: &LinkProvider,
    ) -> Result<Option<LinkMetadata>, ResolveError> {
        match provider {
            LinkProvider::Video { id } => {
                let snippet = self.fetcher.video_snippet(id).await?;
                Ok(snippet.map(|snippet| LinkMetadata {
                    title: snippet.title,
                    description: snippet.description,
                    image_url: Some(thumbnail_url(id)),
                }))
            }
            LinkProvider::Audio | LinkProvider::Book => {
                let tags = self.fetcher.open_graph(link).await?;
                Ok(Some(with_fallbacks(tags, provider)))
            }
        }
    }
}

/// Fill missing or empty tags with the provider's fallbacks
fn with_fallbacks(tags: OpenGraphTags, provider: &LinkProvider) -> LinkMetadata {
    let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

    LinkMetadata {
        title: present(tags.title).or_else(|| provider.fallback_title().map(str::to_string)),
        description: present(tags.description)
            .or_else(|| provider.fallback_description().map(str::to_string)),
        image_url: present(tags.image).or_else(|| Some(FALLBACK_IMAGE.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallbacks_fill_missing_fields() {
        let tags = OpenGraphTags {
            title: Some("Amazing Grace".to_string()),
            description: None,
            image: Some(String::new()),
        };

        let metadata = with_fallbacks(tags, &LinkProvider::Audio);
        assert_eq!(metadata.title.as_deref(), Some("Amazing Grace"));
        assert_eq!(metadata.description.as_deref(), Some("Track from Spotify"));
        assert_eq!(metadata.image_url.as_deref(), Some(FALLBACK_IMAGE));
    }

    #[test]
    fn test_book_fallbacks() {
        let metadata = with_fallbacks(OpenGraphTags::default(), &LinkProvider::Book);
        assert_eq!(metadata.title.as_deref(), Some("Christian Book"));
        assert_eq!(metadata.description.as_deref(), Some("Online Book"));
    }
}
