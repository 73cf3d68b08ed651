//! Link classification.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// 11-character video id after `v=` or a `/`, ending the URL or followed by `?`/`&`
static RE_VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})(?:\?|&|$)").unwrap());

const VIDEO_HOSTS: &[&str] = &["youtube.com", "youtu.be"];
const AUDIO_HOSTS: &[&str] = &["spotify.com"];
const BOOK_MARKERS: &[&str] = &["christianbook", "books", "pdf"];

/// Provider a pasted link belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkProvider {
    /// YouTube video with its id
    Video { id: String },
    /// Spotify track, album or episode
    Audio,
    /// Book retailer page or document
    Book,
}

impl LinkProvider {
    /// Classify a link, first match wins.
    ///
    /// Returns `None` for blank input, unrecognized providers and video
    /// links without a usable id.
    pub fn classify(link: &str) -> Option<Self> {
        let link = link.trim();
        if link.is_empty() {
            return None;
        }

        let host = host_of(link);

        if VIDEO_HOSTS.iter().any(|h| host.contains(h)) {
            return extract_video_id(link).map(|id| LinkProvider::Video { id: id.to_string() });
        }

        if AUDIO_HOSTS.iter().any(|h| host.contains(h)) {
            return Some(LinkProvider::Audio);
        }

        let lower = link.to_lowercase();
        if BOOK_MARKERS.iter().any(|m| lower.contains(m)) {
            return Some(LinkProvider::Book);
        }

        None
    }

    /// Fallback title when the page has none
    pub fn fallback_title(&self) -> Option<&'static str> {
        match self {
            LinkProvider::Video { .. } => None,
            LinkProvider::Audio => Some("Spotify Track"),
            LinkProvider::Book => Some("Christian Book"),
        }
    }

    /// Fallback description when the page has none
    pub fn fallback_description(&self) -> Option<&'static str> {
        match self {
            LinkProvider::Video { .. } => None,
            LinkProvider::Audio => Some("Track from Spotify"),
            LinkProvider::Book => Some("Online Book"),
        }
    }
}

impl fmt::Display for LinkProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkProvider::Video { id } => write!(f, "video ({})", id),
            LinkProvider::Audio => write!(f, "audio"),
            LinkProvider::Book => write!(f, "book"),
        }
    }
}

/// Lowercased host, or the whole link when it does not parse as a URL
fn host_of(link: &str) -> String {
    Url::parse(link)
        .ok()
        .and_then(|url| url.host_str().map(str::to_lowercase))
        .unwrap_or_else(|| link.to_lowercase())
}

/// Pull the 11-character video id out of a YouTube link
pub fn extract_video_id(link: &str) -> Option<&str> {
    RE_VIDEO_ID
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
