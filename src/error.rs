use thiserror::Error;

use crate::fetcher::FetchError;

/// Errors from the scrape phase.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("no product links found on {url}")]
    NoLinksFound { url: String },

    #[error("no product title found on {url}")]
    MissingTitle { url: String },
}

/// Errors from speech synthesis. Never fatal to the job.
#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("no usable text to voice")]
    Skipped,

    #[error("ELEVENLABS_API_KEY is not set")]
    MissingApiKey,

    #[error("speech request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("speech API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to write audio file: {0}")]
    Io(#[from] std::io::Error),
}
