//! Catalogued resources as returned by the REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::Category;

/// A single catalogued content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Opaque identifier. Only `_id` is read; a virtual `id` is ignored.
    #[serde(rename = "_id")]
    pub id: String,

    /// Display title
    pub title: String,

    /// Display description
    pub description: String,

    /// Thumbnail URI
    pub image_url: String,

    /// Where the content actually lives
    pub external_link: String,

    /// Fixed classification
    pub category: Category,

    /// Shown on the landing page
    #[serde(default)]
    pub featured: bool,

    /// Author reference, populated or bare
    #[serde(rename = "authorId", default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
}

impl Resource {
    /// Name of the author, when the backend populated it
    pub fn author_name(&self) -> Option<&str> {
        match &self.author {
            Some(AuthorRef::Populated(author)) => Some(author.name.as_str()),
            _ => None,
        }
    }

    /// True when every field a persisted resource must carry is non-empty
    pub fn is_complete(&self) -> bool {
        [
            &self.title,
            &self.description,
            &self.image_url,
            &self.external_link,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}

/// Reference to the admin who created a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorRef {
    /// `{ "_id": ..., "name": ... }`
    Populated(Author),

    /// Unpopulated object id
    Id(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}
