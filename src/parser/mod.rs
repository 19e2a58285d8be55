//! HTML extraction for listing and detail pages.

mod detail;
mod listing;

use scraper::{ElementRef, Selector};
use tracing::warn;

pub use detail::{extract_description, extract_title, parse_product};
pub use listing::{extract_product_links, parse_listing};

/// Parses a selector from a profile, logging instead of failing on bad CSS.
fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!(selector = css, error = %e, "Ignoring invalid selector");
            None
        }
    }
}

/// Trimmed text content of an element and its descendants.
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn longer_than(text: &str, min_chars: usize) -> bool {
    text.chars().count() > min_chars
}
