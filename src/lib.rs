//! Scrapes product pages, summarizes each description with a language model
//! and narrates the summaries with a text-to-speech service.

pub mod archiver;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod site;
pub mod speech;
pub mod summarizer;

pub use config::Config;
pub use pipeline::{RunSummary, run, run_with_config};
