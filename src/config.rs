use crate::data_paths::DataPaths;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// API credentials for the signed account endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_secret: String,
}

/// Tracker settings persisted alongside the credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerSettings {
    /// Refresh interval for the tracking loop, in seconds
    pub refresh_interval_secs: u64,
    /// Symbols shown by the watch command
    pub watchlist: Vec<String>,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 180,
            watchlist: vec!["BTC".to_string(), "ETH".to_string(), "BNB".to_string()],
        }
    }
}

/// Get the path to the credentials file
fn get_creds_path(data_paths: &DataPaths) -> Result<PathBuf> {
    let auth_dir = data_paths.auth();
    std::fs::create_dir_all(&auth_dir)?;
    Ok(auth_dir.join("creds.json"))
}

/// Get the path to the settings file
fn get_settings_path(data_paths: &DataPaths) -> Result<PathBuf> {
    let auth_dir = data_paths.auth();
    std::fs::create_dir_all(&auth_dir)?;
    Ok(auth_dir.join("settings.json"))
}

/// Save credentials to the data directory
pub fn save_credentials(data_paths: &DataPaths, creds: &ApiCredentials) -> Result<()> {
    let creds_path = get_creds_path(data_paths)?;
    let json = serde_json::to_string_pretty(creds)?;
    std::fs::write(&creds_path, json)?;
    Ok(())
}

/// Load credentials, preferring environment variables over the stored file
pub fn load_credentials(data_paths: &DataPaths) -> Result<ApiCredentials> {
    if let (Ok(api_key), Ok(api_secret)) = (
        std::env::var("BINTRACK_API_KEY"),
        std::env::var("BINTRACK_API_SECRET"),
    ) {
        return Ok(ApiCredentials {
            api_key,
            api_secret,
        });
    }

    let creds_path = get_creds_path(data_paths)?;
    if !creds_path.exists() {
        return Err(anyhow!("No credentials found. Run 'bintrack init' first"));
    }

    let content = std::fs::read_to_string(&creds_path)?;
    let creds: ApiCredentials = serde_json::from_str(&content)?;
    Ok(creds)
}

/// Save tracker settings
pub fn save_settings(data_paths: &DataPaths, settings: &TrackerSettings) -> Result<()> {
    let settings_path = get_settings_path(data_paths)?;
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(&settings_path, json)?;
    Ok(())
}

/// Load tracker settings, falling back to defaults when none are stored
pub fn load_settings(data_paths: &DataPaths) -> Result<TrackerSettings> {
    let settings_path = get_settings_path(data_paths)?;
    if !settings_path.exists() {
        return Ok(TrackerSettings::default());
    }

    let content = std::fs::read_to_string(&settings_path)?;
    let settings: TrackerSettings = serde_json::from_str(&content)?;
    Ok(settings)
}
