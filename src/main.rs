// Rewards search runner
//
// Fills the daily trend-term pool, then performs the day's remaining searches
// in a signed-in browser profile, retrying each search until the points
// counter moves.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::browser::Browser;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rewards_search::{
    BingSearchDriver, DeviceKind, LaunchOptions, RetryExecutor, RewardsConfig, RewardsDashboard,
    RewardsError, SearchSession, TermCache, TermSource, TermSourceSettings, launch_browser,
};

#[derive(Parser)]
#[command(
    name = "rewards-search",
    about = "Daily-trend searches with points-aware retries",
    version
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Perform the remaining searches for today (default).
    Run {
        /// Number of searches; defaults to what the dashboard reports as remaining.
        #[arg(long)]
        searches: Option<u32>,

        /// Which search counter to work on.
        #[arg(long, value_enum, default_value_t = DeviceKind::Desktop)]
        device: DeviceKind,
    },

    /// Inspect or rebuild the term pool.
    Terms {
        #[command(subcommand)]
        action: TermsAction,
    },
}

#[derive(Subcommand)]
enum TermsAction {
    /// Print the pool's load date and terms in rotation order.
    List,

    /// Refetch the pool now, ignoring its load date.
    Refresh {
        /// Number of distinct terms to fetch.
        #[arg(long, default_value_t = 30)]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = RewardsConfig::load(&cli.config)?;
    let cache = TermCache::open(&config.storage_path()?).await?;

    let command = cli.command.unwrap_or(Commands::Run {
        searches: None,
        device: DeviceKind::Desktop,
    });

    // The store is closed on every path, including errors
    let result = match command {
        Commands::Run { searches, device } => run(&config, &cache, searches, device).await,
        Commands::Terms { action } => terms(&config, &cache, action).await,
    };

    cache.close().await;

    if let Err(e) = &result
        && let Some(rewards_error) = e.downcast_ref::<RewardsError>()
    {
        error!(kind = rewards_error.kind(), "Run aborted: {}", rewards_error);
    }
    result
}

async fn run(
    config: &RewardsConfig,
    cache: &TermCache,
    searches: Option<u32>,
    device: DeviceKind,
) -> Result<()> {
    let source = TermSource::new(TermSourceSettings::from_config(config, device.user_agent()))?;

    let browser = launch_browser(&LaunchOptions {
        headless: config.browser.headless,
        user_data_dir: config.user_data_dir()?,
        device,
    })
    .await?;

    let result =
        search_with_browser(config, cache, &source, browser.browser(), searches, device).await;
    browser.shutdown().await;
    result
}

async fn search_with_browser(
    config: &RewardsConfig,
    cache: &TermCache,
    source: &TermSource,
    browser: &Browser,
    searches: Option<u32>,
    device: DeviceKind,
) -> Result<()> {
    let dashboard = RewardsDashboard::open(browser, &config.browser.dashboard_url).await?;
    let remaining = dashboard.remaining_searches().await?;

    let total = searches.unwrap_or_else(|| remaining.for_device(device));
    if total == 0 {
        info!("[BING] No {} searches remaining today", device);
        return Ok(());
    }

    // One pool serves both devices for the whole day
    let pool_size = remaining.total().max(total) as usize;
    cache
        .ensure_fresh(|count| source.fetch_trending_terms(count), pool_size)
        .await?;

    let driver = BingSearchDriver::open(
        browser,
        &config.browser.search_url,
        Duration::from_secs(config.browser.element_timeout_secs),
    )
    .await?;

    let executor = RetryExecutor::new(config.retry_policy()?)
        .with_post_success_pause(config.pauses.post_success);
    let mut session = SearchSession::new(cache, source, driver, dashboard, executor)
        .with_between_searches_pause(config.pauses.between_searches);

    info!("[BING] Starting {} Edge Bing searches...", device);
    let report = session.run_batch(total).await?;
    info!(
        "[BING] Finished {} Edge Bing searches ! ({}/{} credited)",
        device, report.succeeded, report.total
    );
    Ok(())
}

async fn terms(config: &RewardsConfig, cache: &TermCache, action: TermsAction) -> Result<()> {
    match action {
        TermsAction::List => {
            match cache.load_date().await? {
                Some(date) => println!("Loaded on {date}"),
                None => println!("Never loaded"),
            }
            for (index, term) in cache.terms().await?.iter().enumerate() {
                println!("{:>4}  {term}", index + 1);
            }
        }
        TermsAction::Refresh { count } => {
            let source = TermSource::new(TermSourceSettings::from_config(
                config,
                DeviceKind::Desktop.user_agent(),
            ))?;
            cache
                .force_refresh(|n| source.fetch_trending_terms(n), count)
                .await
                .context("Failed to refresh term pool")?;
            println!("Term pool refreshed with {} terms", cache.len().await?);
        }
    }
    Ok(())
}
