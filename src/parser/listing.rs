use std::collections::HashSet;

use scraper::{ElementRef, Html};
use tracing::{debug, info};
use url::Url;

use super::{element_text, selector};
use crate::error::ScrapeError;
use crate::site::SiteProfile;

/// Gathers unique detail-page URLs up to a cap.
struct LinkCollector<'a> {
    site: &'a SiteProfile,
    max: usize,
    seen: HashSet<String>,
    links: Vec<String>,
}

impl<'a> LinkCollector<'a> {
    fn new(site: &'a SiteProfile, max: usize) -> Self {
        Self {
            site,
            max,
            seen: HashSet::new(),
            links: Vec::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.links.len() >= self.max
    }

    fn offer(&mut self, href: &str) {
        if self.is_full() {
            return;
        }
        let Some(url) = self.resolve(href) else {
            return;
        };
        if self.seen.insert(url.clone()) {
            self.links.push(url);
        }
    }

    /// Absolute form of `href` with query and fragment dropped, if it points
    /// at a detail page of this site.
    fn resolve(&self, href: &str) -> Option<String> {
        let mut url = self.site.listing_url.join(href.trim()).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        if !self.site.detail_pattern.matches(url.path()) {
            return None;
        }
        url.set_query(None);
        url.set_fragment(None);
        Some(String::from(url))
    }
}

/// Visible text of a quick-view button. Other link text is product copy and
/// is not matched against the attribute markers.
const QUICK_VIEW_TEXT: &str = "quick view";

fn is_quick_view(anchor: ElementRef<'_>, markers: &[&str]) -> bool {
    let flagged_attr = anchor
        .value()
        .attrs()
        .filter(|(name, _)| *name == "class" || name.starts_with("data-") || name.starts_with("aria-"))
        .flat_map(|(name, value)| [name.to_lowercase(), value.to_lowercase()])
        .any(|hay| markers.iter().any(|marker| hay.contains(marker)));

    let text = element_text(anchor).split_whitespace().collect::<Vec<_>>().join(" ");
    flagged_attr || text.to_lowercase().contains(QUICK_VIEW_TEXT)
}

/// Returns up to `max` unique detail-page URLs from a listing page, in
/// selector order then document order. A `max` of zero is treated as one.
pub fn extract_product_links(doc: &Html, site: &SiteProfile, max: usize) -> Result<Vec<String>, ScrapeError> {
    let mut collector = LinkCollector::new(site, max.max(1));

    'selectors: for css in site.listing_selectors {
        let Some(sel) = selector(css) else { continue };
        for element in doc.select(&sel) {
            if collector.is_full() {
                break 'selectors;
            }
            if let Some(href) = element.value().attr("href") {
                collector.offer(href);
            }
        }
    }

    if collector.links.is_empty() {
        debug!(site = %site.name, "Listing selectors matched nothing, scanning all anchors");
        if let Some(anchors) = selector("a[href]") {
            for anchor in doc.select(&anchors) {
                if collector.is_full() {
                    break;
                }
                if is_quick_view(anchor, site.quick_view_markers) {
                    continue;
                }
                if let Some(href) = anchor.value().attr("href") {
                    collector.offer(href);
                }
            }
        }
    }

    if collector.links.is_empty() {
        return Err(ScrapeError::NoLinksFound {
            url: site.listing_url.to_string(),
        });
    }

    info!(count = collector.links.len(), "Collected product links");
    Ok(collector.links)
}

/// Parses raw listing HTML and extracts its product links.
pub fn parse_listing(html: &str, site: &SiteProfile, max: usize) -> Result<Vec<String>, ScrapeError> {
    let doc = Html::parse_document(html);
    extract_product_links(&doc, site, max)
}
