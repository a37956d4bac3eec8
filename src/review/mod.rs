//! Review extraction and text normalization
//!
//! This module turns a product detail payload into the two strings that get
//! persisted: the free-text description and a multi-line rendering of the
//! structured attribute list.

mod extract;
mod normalize;

pub use extract::{extract_review, try_extract_review, ExtractError};
pub use normalize::normalize;

use serde::{Deserialize, Serialize};

/// One structured review attribute, already normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewAttribute {
    pub title: String,
    pub values: Vec<String>,
}

impl ReviewAttribute {
    /// Renders the attribute as `title: value1 value2`
    ///
    /// An attribute without values renders as `title:`.
    pub fn render(&self) -> String {
        if self.values.is_empty() {
            format!("{}:", self.title)
        } else {
            format!("{}: {}", self.title, self.values.join(" "))
        }
    }
}

/// Normalized review text ready for persistence
///
/// Both fields are empty strings when the source data is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedReview {
    pub description: String,
    /// One `title: values` line per attribute
    pub attributes: String,
}

impl ExtractedReview {
    pub fn is_empty(&self) -> bool {
        self.description.is_empty() && self.attributes.is_empty()
    }
}
