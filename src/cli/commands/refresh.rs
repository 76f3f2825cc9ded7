use anyhow::Result;
use clap::Args;
use tokio::time::Duration;

use crate::config::load_credentials;
use crate::data_paths::DataPaths;
use crate::exchange::ExchangeClient;
use crate::portfolio::display::render_portfolio;
use crate::portfolio::service::start_portfolio_service;
use crate::portfolio::storage::PortfolioStorage;

#[derive(Args)]
pub struct RefreshArgs {}

/// One-shot tick: fetch, value, persist, render
pub async fn execute(host: &str, data_paths: DataPaths, _args: RefreshArgs) -> Result<()> {
    let credentials = load_credentials(&data_paths)?;
    let client = ExchangeClient::with_credentials(host, credentials);
    let storage = PortfolioStorage::new(data_paths.root());

    // The scheduled interval is irrelevant for a single tick
    let handle = start_portfolio_service(client, storage, Duration::from_secs(3600));
    let portfolio = handle.refresh().await?;

    println!("{}", render_portfolio(&portfolio));
    println!(
        "Last updated: {}",
        portfolio.refreshed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(())
}
