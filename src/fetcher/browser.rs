use std::ffi::OsStr;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions, Tab};
use rand::Rng;
use tracing::{debug, info};

use super::{FetchError, PageFetcher, USER_AGENT};

const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);
const IDLE_TIMEOUT: Duration = Duration::from_secs(120);
/// Pause before each navigation, in milliseconds.
const NAVIGATION_JITTER_MS: RangeInclusive<u64> = 1_000..=3_000;

const LAUNCH_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--no-first-run",
    "--no-default-browser-check",
    "--disable-extensions",
    "--mute-audio",
    "--window-size=1920,1080",
    "--lang=en-US",
];

/// Runs in every new document before page scripts.
const STEALTH_JS: &str = r#"
    Object.defineProperty(navigator, 'webdriver', { get: () => undefined, configurable: true });
    Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
    window.chrome = window.chrome || { runtime: {} };
"#;

/// Headless Chrome fetcher.
///
/// One browser and one tab are shared by every fetch of a run. The browser
/// process is killed when the fetcher is dropped.
pub struct BrowserFetcher {
    // Keeps the browser process alive for as long as the tab is in use.
    _browser: Browser,
    tab: Arc<Tab>,
    default_settle: Duration,
}

fn browser_err(e: impl std::fmt::Display) -> FetchError {
    FetchError::Browser(e.to_string())
}

impl BrowserFetcher {
    pub fn launch(default_settle: Duration) -> Result<Self, FetchError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .idle_browser_timeout(IDLE_TIMEOUT)
            .args(LAUNCH_ARGS.iter().map(|arg| OsStr::new(*arg)).collect())
            .build()
            .map_err(browser_err)?;

        let browser = Browser::new(options).map_err(browser_err)?;
        let tab = browser.new_tab().map_err(browser_err)?;
        tab.set_default_timeout(NAVIGATION_TIMEOUT);
        tab.set_user_agent(USER_AGENT, Some("en-US,en;q=0.9"), None)
            .map_err(browser_err)?;
        tab.call_method(Page::AddScriptToEvaluateOnNewDocument {
            source: STEALTH_JS.to_string(),
            world_name: None,
            include_command_line_api: None,
            run_immediately: None,
        })
        .map_err(browser_err)?;

        info!("Headless browser session started");
        Ok(Self {
            _browser: browser,
            tab,
            default_settle,
        })
    }
}

fn navigation_pause() -> Duration {
    Duration::from_millis(rand::rng().random_range(NAVIGATION_JITTER_MS))
}

impl PageFetcher for BrowserFetcher {
    fn fetch(&self, url: &str, settle: Option<Duration>) -> Result<String, FetchError> {
        let pause = navigation_pause();
        debug!(url = %url, pause_ms = pause.as_millis() as u64, "Navigating");
        std::thread::sleep(pause);

        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(browser_err)?;

        std::thread::sleep(settle.unwrap_or(self.default_settle));

        self.tab.get_content().map_err(browser_err)
    }
}

impl Drop for BrowserFetcher {
    fn drop(&mut self) {
        info!("Headless browser session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_pause_stays_within_bounds() {
        for _ in 0..50 {
            let pause = navigation_pause();
            assert!(pause >= Duration::from_secs(1));
            assert!(pause <= Duration::from_secs(3));
        }
    }

    #[test]
    #[ignore = "needs a local Chrome install"]
    fn page_scripts_do_not_see_webdriver() {
        let fetcher = BrowserFetcher::launch(Duration::ZERO).unwrap();
        fetcher
            .tab
            .navigate_to("data:text/html,<h1>hi</h1>")
            .unwrap()
            .wait_until_navigated()
            .unwrap();

        let result = fetcher
            .tab
            .evaluate("navigator.webdriver === undefined", false)
            .unwrap();
        assert_eq!(result.value, Some(serde_json::Value::Bool(true)));
    }
}
