use std::path::PathBuf;

use dotenvy::dotenv;

use crate::site::SiteProfile;

pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";
pub const DEFAULT_MAX_PRODUCTS: usize = 5;

/// What to do with a detail page whose title cannot be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingTitlePolicy {
    /// Drop the product, logging an error for the page.
    #[default]
    Skip,
    /// Drop the product and warn with the full list of skipped pages
    /// once scraping is done.
    Report,
}

/// Job configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub summarizer_api_key: Option<String>,
    pub tts_api_key: Option<String>,
    pub tts_voice_id: String,
    pub max_products_per_run: usize,
    pub target: SiteProfile,
    pub missing_title_policy: MissingTitlePolicy,
    pub data_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub summarizer_base_url: String,
    pub tts_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            summarizer_api_key: None,
            tts_api_key: None,
            tts_voice_id: DEFAULT_VOICE_ID.to_string(),
            max_products_per_run: DEFAULT_MAX_PRODUCTS,
            target: SiteProfile::books(),
            missing_title_policy: MissingTitlePolicy::default(),
            data_dir: PathBuf::from("data"),
            audio_dir: PathBuf::from("audio"),
            summarizer_base_url: "https://api.openai.com".to_string(),
            tts_base_url: "https://api.elevenlabs.io".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Only credentials and the voice id come from the environment; every
    /// other setting keeps its default until overridden with a `with_*` call.
    pub fn from_env() -> Self {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        config.summarizer_api_key = get("OPENAI_API_KEY");
        config.tts_api_key = get("ELEVENLABS_API_KEY");
        if let Some(voice) = get("ELEVENLABS_VOICE_ID") {
            config.tts_voice_id = voice;
        }

        config
    }

    pub fn with_target(mut self, target: SiteProfile) -> Self {
        self.target = target;
        self
    }

    /// At least one product is always requested.
    pub fn with_max_products(mut self, max: usize) -> Self {
        self.max_products_per_run = max.max(1);
        self
    }

    pub fn with_missing_title_policy(mut self, policy: MissingTitlePolicy) -> Self {
        self.missing_title_policy = policy;
        self
    }

    pub fn with_output_dirs(mut self, data_dir: impl Into<PathBuf>, audio_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self.audio_dir = audio_dir.into();
        self
    }

    pub fn raw_snapshot_path(&self) -> PathBuf {
        self.data_dir.join("products.json")
    }

    pub fn final_snapshot_path(&self) -> PathBuf {
        self.data_dir.join("products_with_summaries.json")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::site::FetchStrategy;
    use url::Url;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.summarizer_api_key, None);
        assert_eq!(config.tts_api_key, None);
        assert_eq!(config.tts_voice_id, DEFAULT_VOICE_ID);
        assert_eq!(config.max_products_per_run, 5);
        assert_eq!(config.target.name, "books");
        assert_eq!(config.missing_title_policy, MissingTitlePolicy::Skip);
        assert_eq!(config.raw_snapshot_path(), PathBuf::from("data/products.json"));
        assert_eq!(
            config.final_snapshot_path(),
            PathBuf::from("data/products_with_summaries.json")
        );
    }

    #[test]
    fn reads_credentials_and_voice() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("ELEVENLABS_API_KEY", "xi-test"),
            ("ELEVENLABS_VOICE_ID", "voice-42"),
        ]));
        assert_eq!(config.summarizer_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.tts_api_key.as_deref(), Some("xi-test"));
        assert_eq!(config.tts_voice_id, "voice-42");
    }

    #[test]
    fn blank_voice_falls_back_to_default() {
        let config = Config::from_lookup(lookup(&[("ELEVENLABS_VOICE_ID", "  ")]));
        assert_eq!(config.tts_voice_id, DEFAULT_VOICE_ID);
    }

    #[test]
    fn target_is_chosen_in_code_not_by_environment() {
        let config = Config::from_lookup(lookup(&[(
            "SCRAPE_TARGET",
            "https://shop.example.com/collections/all",
        )]));
        assert_eq!(config.target.strategy, FetchStrategy::Static);

        let shop = SiteProfile::storefront(Url::parse("https://shop.example.com/collections/all").unwrap());
        let config = config.with_target(shop);
        assert_eq!(config.target.strategy, FetchStrategy::Rendered);
        assert_eq!(config.target.name, "shop.example.com");
    }

    #[test]
    fn max_products_is_at_least_one() {
        assert_eq!(Config::default().with_max_products(0).max_products_per_run, 1);
        assert_eq!(Config::default().with_max_products(3).max_products_per_run, 3);
    }
}
