//! serptrack - search result tracker.
//!
//! Reads `keywords.txt` and `whitelist.txt`, scrapes the result pages for
//! every keyword and writes one CSV per keyword with whitelisted domains
//! removed. Configuration comes from `serptrack.toml` (see
//! [`serptrack_core::AppConfig`]).

use anyhow::Context;
use serptrack_core::AppConfig;
use serptrack_scanner::{load_keywords, load_whitelist, BingClient, KeywordDriver, KeywordSearch};
use std::sync::Arc;
use tracing::{debug, info, warn};

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stdout))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting serptrack v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_with_env().context("failed to load configuration")?;
    debug!(?config, "configuration loaded");

    let keywords = load_keywords(&config.run.keywords_file).with_context(|| {
        format!(
            "failed to load keywords from {}",
            config.run.keywords_file.display()
        )
    })?;
    let whitelist = load_whitelist(&config.run.whitelist_file).with_context(|| {
        format!(
            "failed to load whitelist from {}",
            config.run.whitelist_file.display()
        )
    })?;

    let client = BingClient::new(config.search.clone(), config.http.clone())
        .context("failed to build HTTP client")?;
    let search = Arc::new(KeywordSearch::new(Arc::new(client), config.search.clone()));
    let driver = KeywordDriver::new(search, Arc::new(whitelist), &config.run.output_dir)
        .with_max_workers(config.run.max_workers);

    let summary = driver.run(keywords).await;

    if !summary.failed.is_empty() {
        let names: Vec<&str> = summary.failed.iter().map(|f| f.keyword.as_str()).collect();
        warn!("{} keywords failed: {}", names.len(), names.join(", "));
    }

    info!(
        succeeded = summary.succeeded.len(),
        failed = summary.failed.len(),
        rows = summary.total_rows(),
        "all searches completed"
    );

    Ok(())
}
