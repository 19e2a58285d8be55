//! Page fetching.
//!
//! Two interchangeable strategies sit behind [`PageFetcher`]:
//! - [`HttpFetcher`]: one GET per page, for markup served by the server
//! - [`BrowserFetcher`]: a headless Chrome session, for client-rendered markup

mod browser;
mod http;

use std::time::Duration;

use thiserror::Error;

pub use browser::BrowserFetcher;
pub use http::HttpFetcher;

/// Browser identification sent by both strategies.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("browser session failed: {0}")]
    Browser(String),
}

/// Retrieves the HTML of a page.
pub trait PageFetcher {
    /// Returns the page's HTML. `settle` is how long to let client-side
    /// scripts run after navigation; `None` means the fetcher's default.
    fn fetch(&self, url: &str, settle: Option<Duration>) -> Result<String, FetchError>;
}
