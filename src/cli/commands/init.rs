use anyhow::{anyhow, Result};
use clap::Args;
use std::io::Write;

use crate::config::{save_credentials, save_settings, ApiCredentials, TrackerSettings};
use crate::data_paths::DataPaths;

#[derive(Args)]
pub struct InitArgs {
    /// API key (prompted when omitted)
    #[arg(long)]
    pub api_key: Option<String>,

    /// API secret (prompted when omitted)
    #[arg(long)]
    pub api_secret: Option<String>,

    /// Refresh interval for the tracking loop, in seconds
    #[arg(long, default_value_t = 180)]
    pub interval: u64,
}

pub async fn execute(data_paths: DataPaths, args: InitArgs) -> Result<()> {
    let api_key = match args.api_key {
        Some(key) => key,
        None => prompt("API key: ")?,
    };
    let api_secret = match args.api_secret {
        Some(secret) => secret,
        None => prompt("API secret: ")?,
    };

    if api_key.is_empty() || api_secret.is_empty() {
        return Err(anyhow!("API key and secret must both be provided"));
    }

    save_credentials(
        &data_paths,
        &ApiCredentials {
            api_key,
            api_secret,
        },
    )?;

    let settings = TrackerSettings {
        refresh_interval_secs: args.interval,
        ..TrackerSettings::default()
    };
    save_settings(&data_paths, &settings)?;

    println!("Credentials saved under {:?}", data_paths.auth());
    println!("Refresh interval: {}s", settings.refresh_interval_secs);
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
