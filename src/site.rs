//! Per-site scraping profiles.
//!
//! Everything that depends on the target's markup lives here so the
//! extractors stay generic. Selector lists are ordered most-specific first.

use std::time::Duration;

use url::Url;

/// How pages of a site have to be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Markup is present in the server response.
    Static,
    /// Markup is produced client-side; needs a headless browser.
    Rendered,
}

/// Path test for detail-page URLs.
#[derive(Debug, Clone)]
pub struct DetailPattern {
    pub contains: &'static str,
    pub excludes: &'static [&'static str],
}

impl DetailPattern {
    pub fn matches(&self, path: &str) -> bool {
        path.contains(self.contains) && !self.excludes.iter().any(|e| path.contains(e))
    }
}

#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub name: String,
    pub listing_url: Url,
    pub detail_pattern: DetailPattern,
    pub listing_selectors: &'static [&'static str],
    /// Markers that flag an anchor as a quick-view or modal trigger when found
    /// in its `class`, `data-*` or `aria-*` attributes. Link text is never
    /// checked against these.
    pub quick_view_markers: &'static [&'static str],
    pub title_selectors: &'static [&'static str],
    pub description_selectors: &'static [&'static str],
    pub accordion_selector: &'static str,
    pub info_selectors: &'static [&'static str],
    pub main_selectors: &'static [&'static str],
    pub strategy: FetchStrategy,
    pub settle: Duration,
}

const QUICK_VIEW_MARKERS: &[&str] = &["quick-view", "quickview", "quick_view", "modal"];

const TITLE_SELECTORS: &[&str] = &[
    ".product_main h1",
    "h1.product__title",
    ".product__title h1",
    "h1.product-title",
    "h1.product-single__title",
    "[itemprop='name']",
    "h1",
];

const DESCRIPTION_SELECTORS: &[&str] = &[
    "#product_description + p",
    ".product__description",
    ".product-single__description",
    ".product-description",
    "[itemprop='description']",
    ".product__info-container .rte",
    ".rte",
];

const ACCORDION_SELECTOR: &str = "[class*='accordion'] [class*='content']";

const INFO_SELECTORS: &[&str] = &[
    ".product__info-container p",
    ".product__info-wrapper p",
    ".product-info p",
    ".product-single__meta p",
    ".product_page p",
];

const MAIN_SELECTORS: &[&str] = &["main", "#MainContent", "[role='main']", "article", "body"];

impl SiteProfile {
    /// The static book catalogue the job was first written against.
    pub fn books() -> Self {
        SiteProfile {
            name: "books".to_string(),
            listing_url: Url::parse("https://books.toscrape.com/index.html")
                .expect("static listing url"),
            detail_pattern: DetailPattern {
                contains: "/catalogue/",
                excludes: &["/category/", "/page-"],
            },
            listing_selectors: &[".product_pod h3 a", ".product_pod .image_container a"],
            quick_view_markers: QUICK_VIEW_MARKERS,
            title_selectors: TITLE_SELECTORS,
            description_selectors: DESCRIPTION_SELECTORS,
            accordion_selector: ACCORDION_SELECTOR,
            info_selectors: INFO_SELECTORS,
            main_selectors: MAIN_SELECTORS,
            strategy: FetchStrategy::Static,
            settle: Duration::ZERO,
        }
    }

    /// A client-rendered storefront whose collection page lives at `listing_url`.
    pub fn storefront(listing_url: Url) -> Self {
        let name = listing_url.host_str().unwrap_or("storefront").to_string();
        SiteProfile {
            name,
            listing_url,
            detail_pattern: DetailPattern {
                contains: "/products/",
                excludes: &[],
            },
            listing_selectors: &[
                ".product-card a.full-unstyled-link",
                ".card-wrapper a[href*='/products/']",
                ".grid-product__link",
                ".product-item a[href*='/products/']",
                "a.product-card__link",
            ],
            quick_view_markers: QUICK_VIEW_MARKERS,
            title_selectors: TITLE_SELECTORS,
            description_selectors: DESCRIPTION_SELECTORS,
            accordion_selector: ACCORDION_SELECTOR,
            info_selectors: INFO_SELECTORS,
            main_selectors: MAIN_SELECTORS,
            strategy: FetchStrategy::Rendered,
            settle: Duration::from_secs(3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn books_pattern_accepts_detail_pages_only() {
        let pattern = SiteProfile::books().detail_pattern;
        assert!(pattern.matches("/catalogue/sharp-objects_997/index.html"));
        assert!(!pattern.matches("/catalogue/category/books/travel_2/index.html"));
        assert!(!pattern.matches("/catalogue/page-2.html"));
        assert!(!pattern.matches("/index.html"));
    }

    #[test]
    fn profiles_pick_their_fetch_strategy() {
        let books = SiteProfile::books();
        assert_eq!(books.strategy, FetchStrategy::Static);
        assert_eq!(books.name, "books");

        let shop = SiteProfile::storefront(Url::parse("https://shop.example.com/collections/all").unwrap());
        assert_eq!(shop.name, "shop.example.com");
        assert_eq!(shop.strategy, FetchStrategy::Rendered);
        assert!(shop.detail_pattern.matches("/products/blue-mug"));
    }
}
