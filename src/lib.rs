//! dunamis - client for the Dunamis Faith Resource Hub
//!
//! Browses categorized Christian resources (sermons, worship, books,
//! movies) from the hub's REST API, administers them with an admin
//! session, and infers resource details from pasted links.
//!
//! # Modules
//!
//! - `adapters`: External systems (REST API, YouTube, Open Graph proxy)
//! - `domain`: Data structures (Category, Resource, Paginated, ResourceDraft)
//! - `loader`: Category page loading and its view state
//! - `resolver`: Link classification, metadata lookup and draft prefill
//! - `server`: The Open Graph proxy endpoint
//! - `session`: Persisted admin session
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Browse a category
//! dunamis list sermons --page 2
//!
//! # Look up details for a link
//! dunamis resolve https://youtu.be/dQw4w9WgXcQ
//!
//! # Run the Open Graph proxy
//! dunamis serve --address 127.0.0.1:3000
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod loader;
pub mod resolver;
pub mod server;
pub mod session;

// Re-export main types at crate root for convenience
pub use adapters::{AdminClient, ApiClient, ApiError, ResolveError};
pub use domain::{Category, LinkMetadata, Paginated, Resource, ResourceDraft};
pub use loader::{CategoryLoader, CategoryView};
pub use resolver::{LinkPrefill, LinkProvider, LinkResolver, PrefillOutcome};
pub use session::{Session, SessionStore};
