use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use product_narrator::config::MissingTitlePolicy;
use product_narrator::site::SiteProfile;
use product_narrator::{Config, run_with_config};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,product_narrator=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting product narration job");

    // Target and title policy are chosen here; only keys come from the env.
    let config = Config::from_env()
        .with_target(SiteProfile::books())
        .with_missing_title_policy(MissingTitlePolicy::Report);
    let result = run_with_config(&config);

    match result {
        Ok(summary) => {
            info!(
                products = summary.products.len(),
                summaries_failed = summary.summaries_failed,
                audio_files = summary.audio_files.len(),
                "Execution completed successfully"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "Execution failed");
            Err(e)
        }
    }
}
