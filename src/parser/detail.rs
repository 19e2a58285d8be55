use std::collections::HashSet;

use scraper::Html;
use tracing::trace;

use super::{element_text, longer_than, selector};
use crate::error::ScrapeError;
use crate::models::{NO_DESCRIPTION, ProductDetails};
use crate::site::SiteProfile;

const ACCORDION_MIN_CHARS: usize = 50;
const ACCORDION_MAX_BLOCKS: usize = 3;
const INFO_MIN_CHARS: usize = 50;
const PARAGRAPH_MIN_CHARS: usize = 100;
const PARAGRAPH_MAX_COUNT: usize = 2;

/// A single description heuristic. Returns `None` unless it finds non-empty text.
type Matcher = fn(&Html, &SiteProfile) -> Option<String>;

/// Tried in order; the first hit wins.
const DESCRIPTION_MATCHERS: &[(&str, Matcher)] = &[
    ("description block", description_block),
    ("accordion", accordion_content),
    ("product info", product_info),
    ("meta description", meta_description),
    ("main paragraphs", main_paragraphs),
];

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

fn first_text(doc: &Html, selectors: &[&str]) -> Option<String> {
    selectors
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|sel| doc.select(&sel).map(element_text).find(|t| !t.is_empty()))
}

fn description_block(doc: &Html, site: &SiteProfile) -> Option<String> {
    first_text(doc, site.description_selectors)
}

/// Panels nested inside an already matched panel are part of its text and
/// are not collected again.
fn accordion_content(doc: &Html, site: &SiteProfile) -> Option<String> {
    let sel = selector(site.accordion_selector)?;
    let mut matched = HashSet::new();
    let mut blocks: Vec<String> = Vec::new();

    for element in doc.select(&sel) {
        let nested = element.ancestors().any(|a| matched.contains(&a.id()));
        matched.insert(element.id());
        if nested {
            continue;
        }
        let text = element_text(element);
        if longer_than(&text, ACCORDION_MIN_CHARS) && !blocks.contains(&text) {
            blocks.push(text);
            if blocks.len() == ACCORDION_MAX_BLOCKS {
                break;
            }
        }
    }
    non_empty(blocks.join(" "))
}

fn product_info(doc: &Html, site: &SiteProfile) -> Option<String> {
    site.info_selectors
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|sel| {
            let texts: Vec<String> = doc
                .select(&sel)
                .map(element_text)
                .filter(|t| longer_than(t, INFO_MIN_CHARS))
                .collect();
            non_empty(texts.join(" "))
        })
}

fn meta_description(doc: &Html, _site: &SiteProfile) -> Option<String> {
    let sel = selector("meta[name='description']")?;
    doc.select(&sel)
        .filter_map(|meta| meta.value().attr("content"))
        .map(|content| content.trim().to_string())
        .find(|content| !content.is_empty())
}

fn main_paragraphs(doc: &Html, site: &SiteProfile) -> Option<String> {
    let paragraph = selector("p")?;
    let region = site
        .main_selectors
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|sel| doc.select(&sel).next())?;

    let texts: Vec<String> = region
        .select(&paragraph)
        .map(element_text)
        .filter(|t| longer_than(t, PARAGRAPH_MIN_CHARS))
        .take(PARAGRAPH_MAX_COUNT)
        .collect();
    non_empty(texts.join(" "))
}

/// First non-empty title from the profile's title selectors.
pub fn extract_title(doc: &Html, site: &SiteProfile) -> Option<String> {
    first_text(doc, site.title_selectors)
}

/// Best-effort description; never empty.
pub fn extract_description(doc: &Html, site: &SiteProfile) -> String {
    DESCRIPTION_MATCHERS
        .iter()
        .find_map(|(name, matcher)| {
            let found = matcher(doc, site)?;
            trace!(strategy = *name, "Description found");
            Some(found)
        })
        .unwrap_or_else(|| NO_DESCRIPTION.to_string())
}

pub fn parse_product(html: &str, url: &str, site: &SiteProfile) -> Result<ProductDetails, ScrapeError> {
    let doc = Html::parse_document(html);

    let title = extract_title(&doc, site).ok_or_else(|| ScrapeError::MissingTitle {
        url: url.to_string(),
    })?;
    let description = extract_description(&doc, site);

    Ok(ProductDetails { title, description })
}
