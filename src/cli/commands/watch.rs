use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use tokio::time::Duration;
use tracing::warn;

use crate::config::load_settings;
use crate::data_paths::DataPaths;
use crate::exchange::ExchangeClient;
use crate::portfolio::display::format_currency;
use crate::portfolio::prices::resolve_prices;

#[derive(Args)]
pub struct WatchArgs {
    /// Comma-separated symbols to watch (default: stored watchlist)
    #[arg(long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Poll interval in seconds
    #[arg(long, default_value_t = 10)]
    pub interval: u64,
}

/// Live price watchlist over the unsigned ticker endpoint
pub async fn execute(host: &str, data_paths: DataPaths, args: WatchArgs) -> Result<()> {
    let symbols: Vec<String> = if args.symbols.is_empty() {
        load_settings(&data_paths)?.watchlist
    } else {
        args.symbols
            .iter()
            .map(|s| s.trim().to_uppercase())
            .collect()
    };
    let held: HashSet<String> = symbols.iter().cloned().collect();

    let client = ExchangeClient::new(host);
    let mut previous: HashMap<String, Decimal> = HashMap::new();

    println!(
        "Watching {} every {}s (Ctrl-C to stop)",
        symbols.join(", "),
        args.interval
    );

    let mut poll = tokio::time::interval(Duration::from_secs(args.interval));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\nStopping watch");
                return Ok(());
            }
            _ = poll.tick() => {
                match client.fetch_tickers().await {
                    Ok(tickers) => {
                        let index = resolve_prices(&tickers, &held);
                        print_watchlist(&symbols, &index, &previous);
                        previous = index;
                    }
                    Err(e) => warn!("Ticker fetch failed: {}", e),
                }
            }
        }
    }
}

fn print_watchlist(
    symbols: &[String],
    index: &HashMap<String, Decimal>,
    previous: &HashMap<String, Decimal>,
) {
    let mut line = String::new();
    for symbol in symbols {
        let cell = match index.get(symbol) {
            Some(&price) => {
                let rendered = format!("{} {}", symbol.bold(), format_currency(price));
                match previous.get(symbol) {
                    Some(&prev) if price > prev => rendered.green().to_string(),
                    Some(&prev) if price < prev => rendered.red().to_string(),
                    _ => rendered,
                }
            }
            None => format!("{} n/a", symbol.dimmed()),
        };
        line.push_str(&cell);
        line.push_str("   ");
    }
    println!("{}", line.trim_end());
}
