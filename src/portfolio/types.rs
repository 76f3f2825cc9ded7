//! Portfolio type definitions with strong typing

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Resolved USD price per asset symbol. Unresolved assets are absent, not
/// zero; consumers must treat "missing" and "0" differently.
pub type PriceIndex = HashMap<String, Decimal>;

/// Balance with its derived total, kept only when the total is positive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBalance {
    pub asset: String,
    pub free: Decimal,
    pub locked: Decimal,
    pub total: Decimal,
}

/// Balance combined with its resolved price and deltas vs the previous refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuedBalance {
    pub asset: String,
    pub free: Decimal,
    pub locked: Decimal,
    pub total: Decimal,
    /// None when no USD price could be resolved ("price unavailable")
    pub price: Option<Decimal>,
    pub usd_value: Decimal,
    pub change: Decimal,
    pub change_percent: Decimal,
    pub usd_change: Decimal,
}

impl ValuedBalance {
    /// Whether a USD price could be resolved for this asset
    pub fn has_price(&self) -> bool {
        self.price.is_some()
    }
}

/// What we remember about an asset between refreshes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviousBalance {
    pub total: Decimal,
    pub usd_value: Decimal,
}

/// Asset → previous totals, overwritten after every successful valuation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviousSnapshot {
    pub balances: HashMap<String, PreviousBalance>,
}

impl PreviousSnapshot {
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Rebuild the snapshot from the balances just valued
    pub fn from_valued(balances: &[ValuedBalance]) -> Self {
        let balances = balances
            .iter()
            .map(|b| {
                (
                    b.asset.clone(),
                    PreviousBalance {
                        total: b.total,
                        usd_value: b.usd_value,
                    },
                )
            })
            .collect();
        Self { balances }
    }
}

/// One point of the aggregate portfolio series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Display label, e.g. "14:32:05"
    pub time: String,
    pub timestamp: DateTime<Utc>,
    pub total_value: Decimal,
    pub pnl: Decimal,
}

/// One point of a per-asset series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetHistoryPoint {
    pub time: String,
    pub timestamp: DateTime<Utc>,
    pub balance: Decimal,
    pub usd_value: Decimal,
}

/// The outcome of one refresh tick, handed to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuedPortfolio {
    pub balances: Vec<ValuedBalance>,
    pub total_value: Decimal,
    pub pnl: Decimal,
    pub refreshed_at: DateTime<Utc>,
}

impl ValuedPortfolio {
    /// Sum of resolved USD values across all held assets
    pub fn total_usd(balances: &[ValuedBalance]) -> Decimal {
        balances.iter().map(|b| b.usd_value).sum()
    }
}
