//! Scratcher EV entry point.
//!
//! Loads configuration, initialises structured logging,
//! estimates the built-in example ticket, compares the resident snapshot,
//! optionally pulls the live listing, then serves the estimate API until
//! Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use scratcher_ev::comparator::compare_games;
use scratcher_ev::config;
use scratcher_ev::estimator::estimate;
use scratcher_ev::feeds::listing::{extract_listing, sort_listing};
use scratcher_ev::fetch::{HttpTransport, ProxyChain};
use scratcher_ev::server::{self, routes::ServerState};
use scratcher_ev::snapshot;
use scratcher_ev::types::EstimateInput;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = config::AppConfig::load("config.toml")?;

    init_logging();

    let defaults = cfg.estimator.default_options();
    info!(
        include_small_prizes = defaults.include_small_prizes,
        apply_tax = defaults.apply_tax,
        tax_rate_percent = defaults.tax_rate_percent,
        "Scratcher EV starting up"
    );

    // -- Example ticket --------------------------------------------------

    let example = estimate(&EstimateInput::example().with_options(defaults));
    info!(result = %example, "Example ticket");
    for line in example.summary("Example ticket").lines() {
        info!("{line}");
    }
    info!("{}", example.adjustments_text());

    // -- Resident snapshot -----------------------------------------------

    match snapshot::load_snapshot(Some(&cfg.snapshot.path), defaults) {
        Ok(Some(games)) => {
            for row in compare_games(&games) {
                info!(game = %row.name, "{row}");
            }
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Snapshot unavailable"),
    }

    // -- Live listing ----------------------------------------------------

    if cfg.fetch.enabled {
        if let Err(e) = refresh_listing(&cfg.fetch).await {
            warn!(error = %e, "Listing refresh failed");
        }
    }

    // -- API -------------------------------------------------------------

    if cfg.server.enabled {
        let state = Arc::new(ServerState::new(defaults));
        server::serve(state, cfg.server.port).await?;
    }

    info!("Scratcher EV shut down cleanly.");
    Ok(())
}

/// Fetch the listing page through the proxy chain and log what it holds.
async fn refresh_listing(fetch: &config::FetchConfig) -> Result<()> {
    let transport = HttpTransport::new(fetch.timeout(), &fetch.user_agent)?;
    let chain = ProxyChain::new(transport);

    let doc = chain.fetch_document(&fetch.listing_url).await?;
    let mut entries = extract_listing(&doc.content, &fetch.listing_url)?;
    sort_listing(&mut entries);

    info!(
        proxy = %doc.proxy,
        fetched_at = %doc.fetched_at.to_rfc3339(),
        scratchers = entries.len(),
        "Listing refreshed"
    );
    for entry in &entries {
        info!(price = %entry.price, url = %entry.url, "{}", entry.name);
    }

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("scratcher_ev=info"));

    let json_logging = std::env::var("SCRATCHER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
