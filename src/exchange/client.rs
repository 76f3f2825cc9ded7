//! HTTP client for the exchange REST API
//!
//! The account endpoint requires an HMAC-SHA256 signature over the query
//! string plus an `X-MBX-APIKEY` header; the ticker endpoint is unsigned.
//! Timestamps come from the exchange's own clock to avoid recv-window
//! rejections on skewed hosts.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::Duration;
use tracing::debug;

use crate::config::ApiCredentials;
use crate::errors::TrackerError;
use crate::exchange::types::{AccountInfo, ExchangeErrorBody, RawBalance, ServerTime, TickerPrice};

/// Default exchange REST host
pub const DEFAULT_HOST: &str = "https://api.binance.com";

/// Per-request timeout; a refresh tick must fail fast rather than stall
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

type HmacSha256 = Hmac<Sha256>;

pub struct ExchangeClient {
    http: reqwest::Client,
    host: String,
    credentials: Option<ApiCredentials>,
}

impl ExchangeClient {
    /// Create a client for unsigned endpoints only
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            host: host.into(),
            credentials: None,
        }
    }

    /// Create a client that can also call signed endpoints
    pub fn with_credentials(host: impl Into<String>, credentials: ApiCredentials) -> Self {
        let mut client = Self::new(host);
        client.credentials = Some(credentials);
        client
    }

    /// Fetch all balances from the signed account endpoint
    pub async fn fetch_balances(&self) -> Result<Vec<RawBalance>, TrackerError> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or(TrackerError::MissingCredentials)?;

        // Sign with the exchange's clock, not ours
        let timestamp = self.fetch_server_time().await?;
        let query = format!("timestamp={}", timestamp);
        let signature = sign_query(&query, &creds.api_secret);

        let url = format!(
            "{}/api/v3/account?{}&signature={}",
            self.host, query, signature
        );
        let response = self
            .http
            .get(&url)
            .header("X-MBX-APIKEY", &creds.api_key)
            .send()
            .await?;

        let response = check_status(response).await?;
        let account: AccountInfo = response.json().await?;
        debug!(balances = account.balances.len(), "Fetched account balances");
        Ok(account.balances)
    }

    /// Fetch last prices for every tradable pair (unsigned)
    pub async fn fetch_tickers(&self) -> Result<Vec<TickerPrice>, TrackerError> {
        let url = format!("{}/api/v3/ticker/price", self.host);
        let response = self.http.get(&url).send().await?;

        let response = check_status(response).await?;
        let tickers: Vec<TickerPrice> = response.json().await?;
        debug!(tickers = tickers.len(), "Fetched ticker prices");
        Ok(tickers)
    }

    async fn fetch_server_time(&self) -> Result<u64, TrackerError> {
        let url = format!("{}/api/v3/time", self.host);
        let response = self.http.get(&url).send().await?;

        let response = check_status(response).await?;
        let time: ServerTime = response.json().await?;
        Ok(time.server_time)
    }
}

/// HMAC-SHA256 over the query string, hex-encoded
fn sign_query(query: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(query.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Map non-2xx responses to the exchange error taxonomy
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TrackerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ExchangeErrorBody>().await {
        Ok(body) if !body.msg.is_empty() => body.msg,
        _ => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };

    Err(TrackerError::Exchange {
        status: status.as_u16(),
        message,
    })
}
