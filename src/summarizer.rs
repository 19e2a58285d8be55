//! Description summaries via the OpenAI chat completions API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::models::{NO_DESCRIPTION, NOTHING_TO_SUMMARIZE, SUMMARY_FAILED};

const MODEL: &str = "gpt-3.5-turbo";
const MAX_TOKENS: u32 = 100;
const TEMPERATURE: f32 = 0.7;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes book descriptions.";

/// Produces a short summary for a description. Never fails: problems are
/// reported through the sentinel summaries in [`crate::models`].
pub trait Summarizer {
    fn summarize(&self, description: &str) -> String;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

fn user_prompt(description: &str) -> String {
    format!(
        "Summarize this book description into exactly 1-2 sentences. Do not include any introductory text like 'Here is a summary':\n\n{description}"
    )
}

pub struct OpenAiSummarizer {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl OpenAiSummarizer {
    pub fn new(api_key: Option<String>, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create OpenAI HTTP client")?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    fn request_summary(&self, description: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("OPENAI_API_KEY is not set"))?;

        let prompt = user_prompt(description);
        let request = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &prompt },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        debug!(model = MODEL, description_length = description.len(), "Calling OpenAI API");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .context("Failed to send summary request to OpenAI")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("OpenAI returned {status}: {body}");
        }

        let parsed: ChatResponse = response
            .json()
            .context("Failed to parse OpenAI response")?;

        let summary = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| anyhow!("OpenAI response had no content"))?;

        Ok(summary)
    }
}

impl Summarizer for OpenAiSummarizer {
    fn summarize(&self, description: &str) -> String {
        let description = description.trim();
        if description.is_empty() || description == NO_DESCRIPTION {
            return NOTHING_TO_SUMMARIZE.to_string();
        }

        match self.request_summary(description) {
            Ok(summary) => summary,
            Err(e) => {
                error!(error = %format!("{e:#}"), "Summary generation failed");
                SUMMARY_FAILED.to_string()
            }
        }
    }
}
