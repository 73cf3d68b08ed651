//! Display state of a category page.

use crate::adapters::ApiError;
use crate::domain::{Category, Paginated, Resource};

pub const RETRY_HINT: &str = "Please try again later.";
pub const EMPTY_MESSAGE: &str = "No resources found in this category.";
pub const LOADING_MESSAGE: &str = "Loading resources...";

/// Exactly one of loading, failed, empty or loaded
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryView {
    Loading,
    Failed { message: String },
    /// Zero docs; `total_pages` may be 0 or 1
    Empty,
    Loaded(Paginated<Resource>),
}

impl CategoryView {
    /// Fold a load result into a view; an empty page is not an error
    pub fn from_result(result: Result<Paginated<Resource>, ApiError>) -> Self {
        match result {
            Ok(page) if page.is_empty() => CategoryView::Empty,
            Ok(page) => CategoryView::Loaded(page),
            Err(e) => CategoryView::Failed {
                message: e.to_string(),
            },
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, CategoryView::Loading)
    }

    /// Category title and description, followed by a blank line
    pub fn heading(category: Category) -> String {
        format!("{}\n{}\n\n", category.title(), category.description())
    }

    /// Text for the current state, without the heading
    pub fn body(&self) -> String {
        match self {
            CategoryView::Loading => format!("{}\n", LOADING_MESSAGE),
            CategoryView::Failed { message } => format!("{}\n{}\n", message, RETRY_HINT),
            CategoryView::Empty => format!("{}\n", EMPTY_MESSAGE),
            CategoryView::Loaded(page) => {
                let mut out: String = page
                    .docs
                    .iter()
                    .map(|r| format!("{}\n  {}\n  {}\n", r.title, r.description, r.external_link))
                    .collect();
                if page.needs_pagination() {
                    out.push_str(&format!("\nPage {} of {}\n", page.page, page.total_pages));
                }
                out
            }
        }
    }

    /// Plain-text rendering with the category heading
    pub fn render(&self, category: Category) -> String {
        let mut out = Self::heading(category);
        out.push_str(&self.body());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(title: &str) -> Resource {
        serde_json::from_value(serde_json::json!({
            "_id": title,
            "title": title,
            "description": "desc",
            "imageUrl": "/placeholder.svg",
            "externalLink": "https://example.com",
            "category": "sermon",
        }))
        .unwrap()
    }

    fn page(docs: Vec<Resource>, page: u32, total_pages: u32) -> Paginated<Resource> {
        Paginated {
            total_docs: docs.len() as u64,
            docs,
            limit: 9,
            total_pages,
            page,
            has_prev_page: page > 1,
            has_next_page: page < total_pages,
            prev_page: None,
            next_page: None,
            paging_counter: None,
        }
    }

    #[test]
    fn test_empty_page_is_empty_view() {
        assert_eq!(CategoryView::from_result(Ok(page(vec![], 1, 0))), CategoryView::Empty);
        assert_eq!(CategoryView::from_result(Ok(page(vec![], 1, 1))), CategoryView::Empty);

        let text = CategoryView::Empty.render(Category::Book);
        assert!(text.starts_with("Christian Books\n"));
        assert!(text.contains(EMPTY_MESSAGE));
    }

    #[test]
    fn test_failed_view_shows_message_and_hint() {
        let view = CategoryView::from_result(Err(ApiError::Status {
            status: 500,
            message: "Database unavailable".to_string(),
        }));
        let text = view.render(Category::Sermon);
        assert!(text.contains("Database unavailable\nPlease try again later."));
    }

    #[test]
    fn test_pagination_footer_only_with_several_pages() {
        let single = CategoryView::from_result(Ok(page(vec![resource("A")], 1, 1)));
        assert!(!single.render(Category::Sermon).contains("Page "));

        let multi = CategoryView::from_result(Ok(page(vec![resource("A")], 2, 3)));
        assert!(multi.render(Category::Sermon).contains("Page 2 of 3"));
    }

    #[test]
    fn test_loading() {
        assert!(CategoryView::Loading.is_loading());
        assert_eq!(CategoryView::Loading.body(), "Loading resources...\n");
        assert!(CategoryView::Loading.render(Category::Movie).contains(LOADING_MESSAGE));
    }

    #[test]
    fn test_render_is_heading_then_body() {
        let view = CategoryView::from_result(Ok(page(vec![resource("Grace")], 1, 1)));
        let text = view.render(Category::Sermon);

        assert!(text.starts_with(&CategoryView::heading(Category::Sermon)));
        assert!(text.ends_with("Grace\n  desc\n  https://example.com\n"));
        assert_eq!(text, CategoryView::heading(Category::Sermon) + &view.body());
    }
}
