//! Paginated collections returned by listing endpoints.

use serde::{Deserialize, Serialize};

/// One page of items plus the backend's page-count metadata.
///
/// The shape mirrors the listing endpoints verbatim; nothing here is
/// re-validated on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    /// Items on this page, in backend order
    pub docs: Vec<T>,

    /// Total matching items across all pages
    pub total_docs: u64,

    /// Items-per-page limit the backend applied
    pub limit: u32,

    /// Total page count (0 or 1 for an empty collection)
    pub total_pages: u32,

    /// Current page number, 1-based
    pub page: u32,

    #[serde(default)]
    pub has_prev_page: bool,

    #[serde(default)]
    pub has_next_page: bool,

    #[serde(default)]
    pub prev_page: Option<u32>,

    #[serde(default)]
    pub next_page: Option<u32>,

    /// 1-based index of the first item on this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging_counter: Option<u64>,
}

impl<T> Paginated<T> {
    /// True when the page holds no items, whatever `total_pages` says
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Number of items on this page
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether page navigation should be offered
    pub fn needs_pagination(&self) -> bool {
        self.total_pages > 1
    }
}
