use serde::{Serialize, Deserialize};

/// Stored in place of a description when no extraction strategy finds text.
pub const NO_DESCRIPTION: &str = "No description available.";
/// Summary used when there is nothing to summarize.
pub const NOTHING_TO_SUMMARIZE: &str = "No description available to summarize.";
/// Summary used when the summarization call fails.
pub const SUMMARY_FAILED: &str = "Summary generation failed.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub description: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub scraped_at: String,
}

impl Product {
    pub fn new(details: ProductDetails, url: &str) -> Self {
        Product {
            name: details.title,
            description: details.description,
            url: url.to_string(),
            summary: None,
            scraped_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// What the detail extractor pulls out of a single product page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetails {
    pub title: String,
    pub description: String,
}
