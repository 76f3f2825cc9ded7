//! Portfolio persistence layer
//!
//! Stores tracker state in: data/portfolio/
//! - previous_balances.json - snapshot compared against on the next refresh
//! - history.json           - aggregate portfolio series
//! - asset_history.json     - per-asset series map
//!
//! Loads fall back to empty defaults when files are missing, so a fresh data
//! directory behaves like a first run.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::portfolio::history::PortfolioHistory;
use crate::portfolio::types::{AssetHistoryPoint, HistoryPoint, PreviousSnapshot};

const PREVIOUS_FILE: &str = "previous_balances.json";
const HISTORY_FILE: &str = "history.json";
const ASSET_HISTORY_FILE: &str = "asset_history.json";

/// Portfolio storage manager
#[derive(Clone)]
pub struct PortfolioStorage {
    portfolio_dir: PathBuf,
}

impl PortfolioStorage {
    /// Create a new portfolio storage manager rooted at the data directory
    pub fn new(data_dir: &Path) -> Self {
        Self {
            portfolio_dir: data_dir.join("portfolio"),
        }
    }

    /// Initialize storage directories
    pub async fn init_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.portfolio_dir)
            .await
            .context(format!(
                "Failed to create directory: {:?}",
                self.portfolio_dir
            ))?;
        Ok(())
    }

    /// Save the previous-balances snapshot, replacing the last one
    pub async fn save_previous(&self, snapshot: &PreviousSnapshot) -> Result<()> {
        self.write_json(PREVIOUS_FILE, snapshot).await
    }

    /// Load the previous-balances snapshot; empty when none was saved
    pub async fn load_previous(&self) -> Result<PreviousSnapshot> {
        self.read_json(PREVIOUS_FILE).await
    }

    /// Save both historical series
    pub async fn save_history(&self, history: &PortfolioHistory) -> Result<()> {
        self.write_json(HISTORY_FILE, &history.aggregate).await?;
        self.write_json(ASSET_HISTORY_FILE, &history.per_asset)
            .await
    }

    /// Load both historical series; empty when nothing was saved
    pub async fn load_history(&self) -> Result<PortfolioHistory> {
        let aggregate: Vec<HistoryPoint> = self.read_json(HISTORY_FILE).await?;
        let per_asset: HashMap<String, Vec<AssetHistoryPoint>> =
            self.read_json(ASSET_HISTORY_FILE).await?;
        Ok(PortfolioHistory {
            aggregate,
            per_asset,
        })
    }

    /// Remove all persisted state (explicit reset)
    pub async fn clear(&self) -> Result<()> {
        for name in [PREVIOUS_FILE, HISTORY_FILE, ASSET_HISTORY_FILE] {
            let path = self.portfolio_dir.join(name);
            if path.exists() {
                fs::remove_file(&path)
                    .await
                    .context(format!("Failed to remove {:?}", path))?;
            }
        }
        info!("Cleared persisted portfolio state");
        Ok(())
    }

    async fn write_json<T: serde::Serialize>(&self, name: &str, value: &T) -> Result<()> {
        self.init_directories().await?;

        let path = self.portfolio_dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .await
            .context(format!("Failed to write {:?}", path))?;
        Ok(())
    }

    async fn read_json<T: serde::de::DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        let path = self.portfolio_dir.join(name);
        if !path.exists() {
            return Ok(T::default());
        }

        let content = fs::read_to_string(&path)
            .await
            .context(format!("Failed to read {:?}", path))?;
        let value = serde_json::from_str(&content)
            .context(format!("Failed to parse {:?}", path))?;
        Ok(value)
    }
}
