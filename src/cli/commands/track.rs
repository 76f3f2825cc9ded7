use anyhow::Result;
use clap::Args;
use tokio::time::Duration;
use tracing::{info, warn};

use crate::config::{load_credentials, load_settings};
use crate::data_paths::DataPaths;
use crate::exchange::ExchangeClient;
use crate::portfolio::display::render_portfolio;
use crate::portfolio::service::start_portfolio_service;
use crate::portfolio::storage::PortfolioStorage;

#[derive(Args)]
pub struct TrackArgs {
    /// Refresh interval in seconds (default: stored setting)
    #[arg(long)]
    pub interval: Option<u64>,
}

/// Continuous tracking: scheduled refreshes until Ctrl-C.
///
/// The service actor owns the schedule; this command drives an immediate
/// first refresh, then re-renders whenever the actor has produced a newer
/// snapshot.
pub async fn execute(host: &str, data_paths: DataPaths, args: TrackArgs) -> Result<()> {
    let credentials = load_credentials(&data_paths)?;
    let settings = load_settings(&data_paths)?;
    let interval_secs = args.interval.unwrap_or(settings.refresh_interval_secs);

    let client = ExchangeClient::with_credentials(host, credentials);
    let storage = PortfolioStorage::new(data_paths.root());
    let handle =
        start_portfolio_service(client, storage, Duration::from_secs(interval_secs));

    println!("Tracking portfolio every {}s (Ctrl-C to stop)", interval_secs);
    info!(interval_secs, "Tracking started");

    // First refresh right away rather than waiting a full interval
    match handle.refresh().await {
        Ok(portfolio) => println!("{}", render_portfolio(&portfolio)),
        Err(e) => warn!("Initial refresh failed: {}", e),
    }

    let mut last_shown = None;
    let mut poll = tokio::time::interval(Duration::from_secs(5));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\nStopping tracker");
                break;
            }
            _ = poll.tick() => {
                if let Some(portfolio) = handle.portfolio().await? {
                    if last_shown != Some(portfolio.refreshed_at) {
                        last_shown = Some(portfolio.refreshed_at);
                        println!("{}", render_portfolio(&portfolio));
                        println!(
                            "Last updated: {}",
                            portfolio.refreshed_at.format("%H:%M:%S UTC")
                        );
                    }
                }
            }
        }
    }

    Ok(())
}
