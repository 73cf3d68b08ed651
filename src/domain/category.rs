//! Resource categories.
//!
//! The API speaks in singular names (`sermon`), while the public site routes
//! use plural slugs (`sermons`). Both parse to the same [`Category`].

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Fixed classification of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Preached messages
    #[serde(alias = "sermons")]
    Sermon,

    /// Worship music and resources
    Worship,

    /// Christian literature
    #[serde(alias = "books")]
    Book,

    /// Films, testimonies and teachings
    #[serde(alias = "movies")]
    Movie,
}

impl Category {
    /// Every category, in navigation order
    pub const ALL: [Category; 4] = [
        Category::Sermon,
        Category::Worship,
        Category::Book,
        Category::Movie,
    ];

    /// Name used by the REST API
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Category::Sermon => "sermon",
            Category::Worship => "worship",
            Category::Book => "book",
            Category::Movie => "movie",
        }
    }

    /// Plural slug used in site routes
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Sermon => "sermons",
            Category::Worship => "worship",
            Category::Book => "books",
            Category::Movie => "movies",
        }
    }

    /// Heading shown above a category listing
    pub fn title(&self) -> &'static str {
        match self {
            Category::Sermon => "Sermons",
            Category::Worship => "Worship Resources",
            Category::Book => "Christian Books",
            Category::Movie => "Christian Movies",
        }
    }

    /// One-line description shown under the heading
    pub fn description(&self) -> &'static str {
        match self {
            Category::Sermon => {
                "Inspiring messages from renowned preachers to strengthen your faith journey."
            }
            Category::Worship => {
                "Uplifting worship music and resources to enhance your spiritual experience."
            }
            Category::Book => {
                "Enlightening Christian literature to deepen your understanding of faith."
            }
            Category::Movie => {
                "Visual content including testimonies, teachings, and inspirational stories."
            }
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_api_str())
    }
}

impl std::str::FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sermon" | "sermons" => Ok(Category::Sermon),
            "worship" => Ok(Category::Worship),
            "book" | "books" => Ok(Category::Book),
            "movie" | "movies" => Ok(Category::Movie),
            _ => anyhow::bail!("Unknown category: {}", s),
        }
    }
}
