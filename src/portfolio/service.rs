//! Portfolio service actor with channel-based communication
//!
//! All shared mutable state (previous snapshot, history) lives inside the
//! actor task, and every mutation happens on the single refresh path.
//! Commands and scheduled ticks are handled one at a time, so refreshes
//! can never overlap; ticks that fire while a refresh is still running are
//! skipped rather than queued.

use anyhow::Result;
use chrono::Utc;
use std::collections::HashSet;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::errors::TrackerError;
use crate::exchange::ExchangeClient;
use crate::portfolio::history::PortfolioHistory;
use crate::portfolio::normalize::normalize;
use crate::portfolio::prices::resolve_prices;
use crate::portfolio::storage::PortfolioStorage;
use crate::portfolio::types::{
    AssetHistoryPoint, HistoryPoint, PreviousSnapshot, ValuedPortfolio,
};
use crate::portfolio::valuation::value_balances;
use crate::portfolio::window::{filter_window, summarize, Window, WindowSummary};

/// Portfolio service commands
#[derive(Debug)]
pub enum PortfolioCommand {
    Refresh {
        response: oneshot::Sender<Result<ValuedPortfolio, TrackerError>>,
    },
    GetPortfolio {
        response: oneshot::Sender<Option<ValuedPortfolio>>,
    },
    GetAggregateHistory {
        window: Window,
        response: oneshot::Sender<Vec<HistoryPoint>>,
    },
    GetAssetHistory {
        asset: String,
        window: Window,
        response: oneshot::Sender<Vec<AssetHistoryPoint>>,
    },
    GetSummary {
        asset: Option<String>,
        window: Window,
        response: oneshot::Sender<WindowSummary>,
    },
    Reset {
        response: oneshot::Sender<Result<(), TrackerError>>,
    },
}

/// Portfolio service actor
pub struct PortfolioService {
    client: ExchangeClient,
    storage: PortfolioStorage,
    refresh_period: Duration,
    previous: PreviousSnapshot,
    history: PortfolioHistory,
    last_portfolio: Option<ValuedPortfolio>,
    command_rx: mpsc::Receiver<PortfolioCommand>,
}

impl PortfolioService {
    pub fn new(
        client: ExchangeClient,
        storage: PortfolioStorage,
        refresh_period: Duration,
        command_rx: mpsc::Receiver<PortfolioCommand>,
    ) -> Self {
        Self {
            client,
            storage,
            refresh_period,
            previous: PreviousSnapshot::default(),
            history: PortfolioHistory::default(),
            last_portfolio: None,
            command_rx,
        }
    }

    /// Start the portfolio service actor
    pub async fn run(mut self) -> Result<()> {
        info!(period = ?self.refresh_period, "Starting portfolio service");

        self.storage.init_directories().await?;
        self.load_initial_state().await;

        let mut refresh_interval = interval(self.refresh_period);
        // A tick that fires while a refresh is in flight is dropped, never
        // queued behind it
        refresh_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // Consume the immediate first tick; callers decide when the first
        // refresh happens
        refresh_interval.tick().await;

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    match command {
                        Some(cmd) => self.handle_command(cmd).await,
                        None => {
                            info!("Command channel closed, stopping portfolio service");
                            break;
                        }
                    }
                }

                _ = refresh_interval.tick() => {
                    if let Err(e) = self.refresh_tick().await {
                        warn!("Scheduled refresh failed: {}", e);
                    }
                }
            }
        }

        info!("Portfolio service stopped");
        Ok(())
    }

    async fn handle_command(&mut self, command: PortfolioCommand) {
        match command {
            PortfolioCommand::Refresh { response } => {
                let result = self.refresh_tick().await;
                let _ = response.send(result);
            }

            PortfolioCommand::GetPortfolio { response } => {
                let _ = response.send(self.last_portfolio.clone());
            }

            PortfolioCommand::GetAggregateHistory { window, response } => {
                let filtered =
                    filter_window(&self.history.aggregate, window, Utc::now(), |p| p.timestamp);
                let _ = response.send(filtered);
            }

            PortfolioCommand::GetAssetHistory {
                asset,
                window,
                response,
            } => {
                let filtered = filter_window(
                    self.history.asset_series(&asset),
                    window,
                    Utc::now(),
                    |p| p.timestamp,
                );
                let _ = response.send(filtered);
            }

            PortfolioCommand::GetSummary {
                asset,
                window,
                response,
            } => {
                let summary = match asset {
                    Some(asset) => {
                        let filtered = filter_window(
                            self.history.asset_series(&asset),
                            window,
                            Utc::now(),
                            |p| p.timestamp,
                        );
                        let values: Vec<_> = filtered.iter().map(|p| p.usd_value).collect();
                        summarize(&values)
                    }
                    None => {
                        let filtered = filter_window(
                            &self.history.aggregate,
                            window,
                            Utc::now(),
                            |p| p.timestamp,
                        );
                        let values: Vec<_> = filtered.iter().map(|p| p.total_value).collect();
                        summarize(&values)
                    }
                };
                let _ = response.send(summary);
            }

            PortfolioCommand::Reset { response } => {
                let result = self.reset().await;
                let _ = response.send(result);
            }
        }
    }

    /// Load persisted state; a fresh data directory just starts empty
    async fn load_initial_state(&mut self) {
        match self.storage.load_previous().await {
            Ok(previous) => self.previous = previous,
            Err(e) => warn!("Failed to load previous snapshot: {}", e),
        }
        match self.storage.load_history().await {
            Ok(history) => {
                if !history.aggregate.is_empty() {
                    info!(points = history.aggregate.len(), "Loaded portfolio history");
                }
                self.history = history;
            }
            Err(e) => warn!("Failed to load history: {}", e),
        }
    }

    /// One end-to-end refresh: fetch, value, record, persist.
    ///
    /// A fetch failure aborts the tick with all state untouched. A
    /// persistence failure downgrades the tick to in-memory only; the next
    /// tick retries the write.
    async fn refresh_tick(&mut self) -> Result<ValuedPortfolio, TrackerError> {
        debug!("Refreshing portfolio...");

        // Both fetches are read-only and unrelated, run them concurrently;
        // either failure means no valuation this tick
        let (raw_balances, tickers) =
            tokio::try_join!(self.client.fetch_balances(), self.client.fetch_tickers())?;

        let balances = normalize(raw_balances);
        let held: HashSet<String> = balances.iter().map(|b| b.asset.clone()).collect();
        let prices = resolve_prices(&tickers, &held);
        let valued = value_balances(&balances, &prices, &self.previous);

        let now = Utc::now();
        let pnl = self.history.record(&valued, now);
        self.previous = PreviousSnapshot::from_valued(&valued);

        let portfolio = ValuedPortfolio {
            total_value: ValuedPortfolio::total_usd(&valued),
            balances: valued,
            pnl,
            refreshed_at: now,
        };
        self.last_portfolio = Some(portfolio.clone());

        if let Err(e) = self.persist().await {
            warn!("Persistence failed, keeping refresh in memory: {}", e);
        }

        info!(
            assets = portfolio.balances.len(),
            total = %portfolio.total_value,
            pnl = %portfolio.pnl,
            "Portfolio refreshed"
        );
        Ok(portfolio)
    }

    async fn persist(&self) -> Result<()> {
        self.storage.save_previous(&self.previous).await?;
        self.storage.save_history(&self.history).await?;
        Ok(())
    }

    async fn reset(&mut self) -> Result<(), TrackerError> {
        self.previous = PreviousSnapshot::default();
        self.history = PortfolioHistory::default();
        self.last_portfolio = None;
        self.storage
            .clear()
            .await
            .map_err(|e| TrackerError::Persistence(std::io::Error::other(e)))?;
        Ok(())
    }
}

/// Portfolio service handle for sending commands
#[derive(Clone)]
pub struct PortfolioHandle {
    command_tx: mpsc::Sender<PortfolioCommand>,
}

impl PortfolioHandle {
    pub fn new(command_tx: mpsc::Sender<PortfolioCommand>) -> Self {
        Self { command_tx }
    }

    /// Run one refresh tick and return the valued portfolio
    pub async fn refresh(&self) -> Result<ValuedPortfolio> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(PortfolioCommand::Refresh { response: tx })
            .await?;
        Ok(rx.await??)
    }

    /// Get the portfolio from the most recent successful refresh
    pub async fn portfolio(&self) -> Result<Option<ValuedPortfolio>> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(PortfolioCommand::GetPortfolio { response: tx })
            .await?;
        Ok(rx.await?)
    }

    /// Get the aggregate series sliced to the window
    pub async fn aggregate_history(&self, window: Window) -> Result<Vec<HistoryPoint>> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(PortfolioCommand::GetAggregateHistory {
                window,
                response: tx,
            })
            .await?;
        Ok(rx.await?)
    }

    /// Get one asset's series sliced to the window
    pub async fn asset_history(
        &self,
        asset: String,
        window: Window,
    ) -> Result<Vec<AssetHistoryPoint>> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(PortfolioCommand::GetAssetHistory {
                asset,
                window,
                response: tx,
            })
            .await?;
        Ok(rx.await?)
    }

    /// Summarize the windowed series (aggregate, or one asset's)
    pub async fn summary(&self, asset: Option<String>, window: Window) -> Result<WindowSummary> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(PortfolioCommand::GetSummary {
                asset,
                window,
                response: tx,
            })
            .await?;
        Ok(rx.await?)
    }

    /// Clear all persisted and in-memory state
    pub async fn reset(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(PortfolioCommand::Reset { response: tx })
            .await?;
        Ok(rx.await??)
    }
}

/// Start the portfolio service and return a handle to it
pub fn start_portfolio_service(
    client: ExchangeClient,
    storage: PortfolioStorage,
    refresh_period: Duration,
) -> PortfolioHandle {
    let (command_tx, command_rx) = mpsc::channel(32);
    let handle = PortfolioHandle::new(command_tx);

    let service = PortfolioService::new(client, storage, refresh_period, command_rx);
    tokio::spawn(async move {
        if let Err(e) = service.run().await {
            error!("Portfolio service error: {}", e);
        }
    });

    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiCredentials;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_exchange(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/v3/time"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"serverTime": 1625246363776u64})),
            )
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v3/account"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "balances": [
                    {"asset": "BTC", "free": "1.0", "locked": "0.0"},
                    {"asset": "LDBNB", "free": "2.0", "locked": "0.0"},
                    {"asset": "DUST", "free": "0.0", "locked": "0.0"}
                ]
            })))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v3/ticker/price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"symbol": "BTCUSDT", "price": "50000.00"},
                {"symbol": "BNBUSDT", "price": "300.00"}
            ])))
            .mount(server)
            .await;
    }

    fn start_test_service(server_uri: String, data_dir: &std::path::Path) -> PortfolioHandle {
        let client = ExchangeClient::with_credentials(
            server_uri,
            ApiCredentials {
                api_key: "k".to_string(),
                api_secret: "s".to_string(),
            },
        );
        let storage = PortfolioStorage::new(data_dir);
        start_portfolio_service(client, storage, Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn test_refresh_values_and_persists() {
        let server = MockServer::start().await;
        mock_exchange(&server).await;
        let dir = TempDir::new().unwrap();

        let handle = start_test_service(server.uri(), dir.path());
        let portfolio = handle.refresh().await.unwrap();

        // Zero-balance assets are gone, held assets valued
        assert_eq!(portfolio.balances.len(), 2);
        assert_eq!(portfolio.balances[0].asset, "LDBNB");
        assert_eq!(portfolio.balances[0].usd_value, dec!(600.00));
        assert_eq!(portfolio.balances[1].asset, "BTC");
        assert_eq!(portfolio.balances[1].usd_value, dec!(50000.00));
        assert_eq!(portfolio.total_value, dec!(50600.00));
        assert_eq!(portfolio.pnl, Decimal::ZERO);

        // The snapshot hit disk and reloads on a fresh storage instance
        let storage = PortfolioStorage::new(dir.path());
        let previous = storage.load_previous().await.unwrap();
        assert_eq!(previous.balances["BTC"].usd_value, dec!(50000.00));
    }

    #[tokio::test]
    async fn test_second_identical_refresh_has_zero_change() {
        let server = MockServer::start().await;
        mock_exchange(&server).await;
        let dir = TempDir::new().unwrap();

        let handle = start_test_service(server.uri(), dir.path());
        handle.refresh().await.unwrap();
        let second = handle.refresh().await.unwrap();

        for balance in &second.balances {
            assert_eq!(balance.change, Decimal::ZERO);
            assert_eq!(balance.change_percent, Decimal::ZERO);
            assert_eq!(balance.usd_change, Decimal::ZERO);
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_tick_and_keeps_state() {
        let server = MockServer::start().await;
        mock_exchange(&server).await;
        let dir = TempDir::new().unwrap();

        let handle = start_test_service(server.uri(), dir.path());
        handle.refresh().await.unwrap();

        // Kill the exchange; refresh must fail but last state survives
        server.reset().await;
        assert!(handle.refresh().await.is_err());

        let portfolio = handle.portfolio().await.unwrap();
        assert!(portfolio.is_some());
        assert_eq!(portfolio.unwrap().total_value, dec!(50600.00));
    }

    #[tokio::test]
    async fn test_history_accumulates_and_summary_reads_it() {
        let server = MockServer::start().await;
        mock_exchange(&server).await;
        let dir = TempDir::new().unwrap();

        let handle = start_test_service(server.uri(), dir.path());
        handle.refresh().await.unwrap();
        handle.refresh().await.unwrap();

        let history = handle.aggregate_history(Window::All).await.unwrap();
        assert_eq!(history.len(), 2);

        let asset_history = handle
            .asset_history("BTC".to_string(), Window::All)
            .await
            .unwrap();
        assert_eq!(asset_history.len(), 2);

        let summary = handle.summary(None, Window::All).await.unwrap();
        assert_eq!(summary.current, dec!(50600.00));
        assert_eq!(summary.delta, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let server = MockServer::start().await;
        mock_exchange(&server).await;
        let dir = TempDir::new().unwrap();

        let handle = start_test_service(server.uri(), dir.path());
        handle.refresh().await.unwrap();
        handle.reset().await.unwrap();

        assert!(handle.portfolio().await.unwrap().is_none());
        assert!(handle
            .aggregate_history(Window::All)
            .await
            .unwrap()
            .is_empty());

        let storage = PortfolioStorage::new(dir.path());
        assert!(storage.load_previous().await.unwrap().is_empty());
    }
}
