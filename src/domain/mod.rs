//! Data model for the resource hub.
//!
//! - Category: the fixed classification of resources
//! - Resource: a catalogued content item
//! - Paginated: one page of a listing
//! - ResourceDraft: admin form state for create/update
//! - LinkMetadata: details inferred from an external link

pub mod category;
pub mod draft;
pub mod metadata;
pub mod page;
pub mod resource;

pub use category::Category;
pub use draft::{DraftError, ResourceDraft, PLACEHOLDER_IMAGE};
pub use metadata::LinkMetadata;
pub use page::Paginated;
pub use resource::{Author, AuthorRef, Resource};
