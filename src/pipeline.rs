//! The batch job: scrape, snapshot, summarize, narrate, snapshot.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::{error, info, warn};

use crate::archiver::save_snapshot;
use crate::config::{Config, MissingTitlePolicy};
use crate::error::{ScrapeError, SynthesisError};
use crate::fetcher::{BrowserFetcher, HttpFetcher, PageFetcher};
use crate::models::{Product, ProductDetails, SUMMARY_FAILED};
use crate::parser::{parse_listing, parse_product};
use crate::site::{FetchStrategy, SiteProfile};
use crate::speech::{ElevenLabsSynthesizer, Synthesizer};
use crate::summarizer::{OpenAiSummarizer, Summarizer};

/// Outcome of the scrape phase.
#[derive(Debug, Default)]
pub struct ScrapeReport {
    pub products: Vec<Product>,
    /// Pages dropped because no title could be found.
    pub skipped: Vec<String>,
    /// Pages that could not be fetched.
    pub failed: Vec<String>,
}

#[derive(Debug)]
pub struct RunSummary {
    pub products: Vec<Product>,
    pub summaries_failed: usize,
    pub audio_files: Vec<PathBuf>,
}

fn scrape_detail(fetcher: &impl PageFetcher, site: &SiteProfile, url: &str) -> Result<ProductDetails, ScrapeError> {
    let html = fetcher
        .fetch(url, Some(site.settle))
        .map_err(|source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        })?;
    parse_product(&html, url, site)
}

/// Fetches the listing page, then every linked detail page in order.
///
/// Only a failure on the listing page is returned as an error; detail pages
/// that fail are recorded in the report and left out.
pub fn scrape_products(fetcher: &impl PageFetcher, config: &Config) -> Result<ScrapeReport, ScrapeError> {
    let site = &config.target;
    let listing_url = site.listing_url.as_str();

    info!(url = %listing_url, site = %site.name, "Fetching product list");
    let html = fetcher
        .fetch(listing_url, None)
        .map_err(|source| ScrapeError::Fetch {
            url: listing_url.to_string(),
            source,
        })?;
    let links = parse_listing(&html, site, config.max_products_per_run)?;
    info!(count = links.len(), "Found products, fetching details");

    let mut report = ScrapeReport::default();
    for link in links {
        info!(url = %link, "Scraping");
        match scrape_detail(fetcher, site, &link) {
            Ok(details) => report.products.push(Product::new(details, &link)),
            Err(e @ ScrapeError::MissingTitle { .. }) => {
                error!(error = %e, "Skipping product");
                report.skipped.push(link);
            }
            Err(e) => {
                error!(error = %e, "Failed to scrape product");
                report.failed.push(link);
            }
        }
    }

    if config.missing_title_policy == MissingTitlePolicy::Report && !report.skipped.is_empty() {
        warn!(
            count = report.skipped.len(),
            urls = ?report.skipped,
            "Products dropped for missing titles"
        );
    }

    Ok(report)
}

/// Runs the whole job. The fetcher is dropped as soon as scraping ends.
pub fn run<F: PageFetcher>(
    config: &Config,
    fetcher: F,
    summarizer: &impl Summarizer,
    synthesizer: &impl Synthesizer,
) -> Result<RunSummary> {
    info!("[Step 1/4] Scraping products");
    let report = scrape_products(&fetcher, config);
    drop(fetcher);
    let report = report.context("Scraping failed")?;
    info!(
        scraped = report.products.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "Scraping finished"
    );
    let mut products = report.products;

    if products.is_empty() {
        bail!("No products found during scraping");
    }

    info!("[Step 2/4] Saving raw data");
    let raw_path = config.raw_snapshot_path();
    save_snapshot(&products, &raw_path)?;
    info!(path = %raw_path.display(), "Data saved");

    info!("[Step 3/4 & 4/4] Summarizing and generating audio");
    let mut summaries_failed = 0;
    let mut audio_files = Vec::new();
    for (i, product) in products.iter_mut().enumerate() {
        let index = i + 1;
        info!(index, name = %product.name, "Processing product");

        let summary = summarizer.summarize(&product.description);
        info!(index, summary = %summary, "Summary generated");
        if summary == SUMMARY_FAILED {
            summaries_failed += 1;
        }

        match synthesizer.synthesize(&summary, index) {
            Ok(path) => audio_files.push(path),
            Err(SynthesisError::Skipped) => info!(index, "Skipping audio, no usable summary"),
            Err(e) => error!(index, error = %e, "Error generating audio"),
        }

        product.summary = Some(summary);
    }

    let final_path = config.final_snapshot_path();
    save_snapshot(&products, &final_path)?;
    info!(path = %final_path.display(), "Updated data saved");

    Ok(RunSummary {
        products,
        summaries_failed,
        audio_files,
    })
}

/// Builds the real clients and the fetcher the target site needs, then runs.
pub fn run_with_config(config: &Config) -> Result<RunSummary> {
    let summarizer = OpenAiSummarizer::new(config.summarizer_api_key.clone(), &config.summarizer_base_url)?;
    let synthesizer = ElevenLabsSynthesizer::new(
        config.tts_api_key.clone(),
        &config.tts_voice_id,
        &config.tts_base_url,
        &config.audio_dir,
    )
    .context("Failed to create ElevenLabs HTTP client")?;

    match config.target.strategy {
        FetchStrategy::Static => {
            let fetcher = HttpFetcher::new().context("Failed to create HTTP client")?;
            run(config, fetcher, &summarizer, &synthesizer)
        }
        FetchStrategy::Rendered => {
            let fetcher = BrowserFetcher::launch(config.target.settle)
                .context("Failed to launch headless browser")?;
            run(config, fetcher, &summarizer, &synthesizer)
        }
    }
}
