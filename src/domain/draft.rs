//! Editable admin form state for creating and updating resources.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::category::Category;
use super::metadata::LinkMetadata;
use super::resource::Resource;

/// Thumbnail used until the admin or a link lookup provides one
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg?height=400&width=600";

/// Draft validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Please fill in all required fields (missing: {})", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// Body sent on create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDraft {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub external_link: String,
    pub category: Category,
    #[serde(default)]
    pub featured: bool,
}

impl ResourceDraft {
    /// Blank draft for a new resource in `category`
    pub fn new(category: Category) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            image_url: PLACEHOLDER_IMAGE.to_string(),
            external_link: String::new(),
            category,
            featured: false,
        }
    }

    /// Set the external link
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.external_link = link.into();
        self
    }

    /// Overwrite fields with whatever the metadata carries.
    ///
    /// Absent metadata fields leave the draft's current value in place.
    pub fn apply_metadata(&mut self, metadata: &LinkMetadata) {
        if let Some(title) = &metadata.title {
            self.title = title.clone();
        }
        if let Some(description) = &metadata.description {
            self.description = description.clone();
        }
        if let Some(image_url) = &metadata.image_url {
            self.image_url = image_url.clone();
        }
    }

    /// Check the required fields before submitting
    pub fn validate(&self) -> Result<(), DraftError> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.description.trim().is_empty() {
            missing.push("description");
        }
        if self.external_link.trim().is_empty() {
            missing.push("externalLink");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DraftError::MissingFields(missing))
        }
    }
}

impl From<&Resource> for ResourceDraft {
    fn from(resource: &Resource) -> Self {
        Self {
            title: resource.title.clone(),
            description: resource.description.clone(),
            image_url: resource.image_url.clone(),
            external_link: resource.external_link.clone(),
            category: resource.category,
            featured: resource.featured,
        }
    }
}
