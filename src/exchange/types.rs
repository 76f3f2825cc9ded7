//! Wire types for the exchange REST endpoints
//!
//! Numeric fields arrive as JSON strings and are decoded into `Decimal`
//! directly, so no precision is lost between the wire and persistence.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One tradable pair and its last price, e.g. {"symbol":"BTCUSDT","price":"50000.00"}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerPrice {
    pub symbol: String,
    pub price: Decimal,
}

/// Per-asset balance entry from the account endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBalance {
    pub asset: String,
    pub free: Decimal,
    pub locked: Decimal,
}

/// Account endpoint response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    pub balances: Vec<RawBalance>,
}

/// Server time response, used for signed request timestamps
#[derive(Debug, Clone, Deserialize)]
pub struct ServerTime {
    #[serde(rename = "serverTime")]
    pub server_time: u64,
}

/// Error body the exchange returns on non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeErrorBody {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
}
