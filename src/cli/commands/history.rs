use anyhow::Result;
use clap::Args;
use tokio::time::Duration;

use crate::config::load_credentials;
use crate::data_paths::DataPaths;
use crate::exchange::ExchangeClient;
use crate::portfolio::display::{format_currency, render_history, render_summary};
use crate::portfolio::service::start_portfolio_service;
use crate::portfolio::storage::PortfolioStorage;
use crate::portfolio::window::Window;

#[derive(Args)]
pub struct HistoryArgs {
    /// Show one asset's series instead of the aggregate
    #[arg(long)]
    pub asset: Option<String>,

    /// Time window to slice the series to
    #[arg(long, value_enum, default_value = "all")]
    pub window: Window,
}

/// Render persisted history without refreshing anything
pub async fn execute(host: &str, data_paths: DataPaths, args: HistoryArgs) -> Result<()> {
    // History reads work without credentials; the signed client is only
    // needed once a refresh is requested
    let client = match load_credentials(&data_paths) {
        Ok(credentials) => ExchangeClient::with_credentials(host, credentials),
        Err(_) => ExchangeClient::new(host),
    };
    let storage = PortfolioStorage::new(data_paths.root());
    let handle = start_portfolio_service(client, storage, Duration::from_secs(3600));

    let asset = args.asset.map(|a| a.to_uppercase());
    match &asset {
        Some(asset) => {
            let points = handle.asset_history(asset.clone(), args.window).await?;
            if points.is_empty() {
                println!("No {} history in the last {} yet.", asset, args.window);
                return Ok(());
            }
            println!("{} history ({} points):", asset, points.len());
            for point in &points {
                println!(
                    "  {}  balance {}  value {}",
                    point.time,
                    point.balance,
                    format_currency(point.usd_value)
                );
            }
        }
        None => {
            let points = handle.aggregate_history(args.window).await?;
            print!("{}", render_history(&points, args.window));
        }
    }

    let summary = handle.summary(asset, args.window).await?;
    println!("{}", render_summary(&summary, args.window));
    Ok(())
}
