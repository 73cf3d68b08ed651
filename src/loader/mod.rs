//! Category resource loading.
//!
//! [`CategoryLoader`] fetches one page of a category; [`CategoryView`]
//! is the state a caller shows while and after it does.

pub mod view;

use tracing::{debug, instrument};

use crate::adapters::{ApiClient, ApiError};
use crate::config::DEFAULT_PAGE_SIZE;
use crate::domain::{Category, Paginated, Resource};

pub use view::CategoryView;

/// Loads category pages with a fixed page size
#[derive(Debug, Clone)]
pub struct CategoryLoader {
    client: ApiClient,
    page_size: u32,
}

impl CategoryLoader {
    /// Loader with the default page size
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetch `page` of `category` with the configured page size.
    ///
    /// The backend's page is returned verbatim. One request, no retry.
    pub async fn load(&self, category: Category, page: u32) -> Result<Paginated<Resource>, ApiError> {
        self.load_with_limit(category, page, self.page_size).await
    }

    /// Fetch `page` of `category` with an explicit limit
    #[instrument(skip(self), fields(category = %category))]
    pub async fn load_with_limit(
        &self,
        category: Category,
        page: u32,
        limit: u32,
    ) -> Result<Paginated<Resource>, ApiError> {
        let result = self.client.resources_by_category(category, page, limit).await?;
        debug!(
            docs = result.len(),
            total_pages = result.total_pages,
            "Loaded category page"
        );
        Ok(result)
    }

    /// Load and fold the outcome into a view
    pub async fn view(&self, category: Category, page: u32) -> CategoryView {
        CategoryView::from_result(self.load(category, page).await)
    }
}
