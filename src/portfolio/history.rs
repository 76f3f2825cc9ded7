//! Bounded historical series for the portfolio and each asset
//!
//! Both series are append-then-trim: new points go on the end and only the
//! last `HISTORY_CAP` survive, oldest evicted first. PnL for a new aggregate
//! point is measured against the oldest point still retained, so the
//! baseline quietly advances once the cap starts trimming. That behavior
//! is intentional and pinned by a test below.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::portfolio::types::{AssetHistoryPoint, HistoryPoint, ValuedBalance};

/// Maximum retained points per series
pub const HISTORY_CAP: usize = 100;

/// The aggregate series plus one series per asset, owned exclusively here
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioHistory {
    pub aggregate: Vec<HistoryPoint>,
    pub per_asset: HashMap<String, Vec<AssetHistoryPoint>>,
}

impl PortfolioHistory {
    /// Record one refresh: an aggregate point derived from the valued
    /// balances, and one point per held asset. Returns the aggregate PnL.
    pub fn record(&mut self, balances: &[ValuedBalance], at: DateTime<Utc>) -> Decimal {
        let total_value: Decimal = balances.iter().map(|b| b.usd_value).sum();
        let time = at.format("%H:%M:%S").to_string();

        // PnL baseline is the oldest retained aggregate point
        let baseline = self
            .aggregate
            .first()
            .map(|p| p.total_value)
            .unwrap_or(total_value);
        let pnl = total_value - baseline;

        self.push_aggregate(HistoryPoint {
            time: time.clone(),
            timestamp: at,
            total_value,
            pnl,
        });

        for balance in balances {
            self.push_asset(
                &balance.asset,
                AssetHistoryPoint {
                    time: time.clone(),
                    timestamp: at,
                    balance: balance.total,
                    usd_value: balance.usd_value,
                },
            );
        }

        pnl
    }

    /// Append to the aggregate series, trimming to the cap
    pub fn push_aggregate(&mut self, point: HistoryPoint) {
        self.aggregate.push(point);
        trim(&mut self.aggregate);
    }

    /// Append to an asset's series, starting it if this is the first point
    pub fn push_asset(&mut self, asset: &str, point: AssetHistoryPoint) {
        let series = self.per_asset.entry(asset.to_string()).or_default();
        series.push(point);
        trim(series);
    }

    pub fn asset_series(&self, asset: &str) -> &[AssetHistoryPoint] {
        self.per_asset
            .get(asset)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Hard FIFO truncation to the last `HISTORY_CAP` entries
fn trim<T>(series: &mut Vec<T>) {
    if series.len() > HISTORY_CAP {
        series.drain(..series.len() - HISTORY_CAP);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn point(value: Decimal, offset_secs: i64) -> HistoryPoint {
        let timestamp = Utc::now() + chrono::Duration::seconds(offset_secs);
        HistoryPoint {
            time: timestamp.format("%H:%M:%S").to_string(),
            timestamp,
            total_value: value,
            pnl: Decimal::ZERO,
        }
    }

    fn valued(asset: &str, usd_value: Decimal) -> ValuedBalance {
        ValuedBalance {
            asset: asset.to_string(),
            free: dec!(1),
            locked: Decimal::ZERO,
            total: dec!(1),
            price: Some(usd_value),
            usd_value,
            change: Decimal::ZERO,
            change_percent: Decimal::ZERO,
            usd_change: Decimal::ZERO,
        }
    }

    #[test]
    fn test_series_never_exceeds_cap() {
        let mut history = PortfolioHistory::default();
        for i in 0..150 {
            history.push_aggregate(point(Decimal::from(i), i));
        }

        assert_eq!(history.aggregate.len(), HISTORY_CAP);
        // The retained window is the last 100 appended, in append order
        assert_eq!(history.aggregate[0].total_value, Decimal::from(50));
        assert_eq!(history.aggregate[99].total_value, Decimal::from(149));
    }

    #[test]
    fn test_asset_series_starts_empty_and_trims() {
        let mut history = PortfolioHistory::default();
        assert!(history.asset_series("BTC").is_empty());

        for i in 0..120 {
            history.push_asset(
                "BTC",
                AssetHistoryPoint {
                    time: String::new(),
                    timestamp: Utc::now(),
                    balance: dec!(1),
                    usd_value: Decimal::from(i),
                },
            );
        }

        let series = history.asset_series("BTC");
        assert_eq!(series.len(), HISTORY_CAP);
        assert_eq!(series[0].usd_value, Decimal::from(20));
    }

    #[test]
    fn test_record_computes_pnl_against_first_point() {
        let mut history = PortfolioHistory::default();

        let pnl = history.record(&[valued("BTC", dec!(50000))], Utc::now());
        assert_eq!(pnl, Decimal::ZERO);

        let pnl = history.record(&[valued("BTC", dec!(51000))], Utc::now());
        assert_eq!(pnl, dec!(1000));
        assert_eq!(history.aggregate.len(), 2);
        assert_eq!(history.asset_series("BTC").len(), 2);
    }

    #[test]
    fn test_pnl_baseline_shifts_after_trim() {
        let mut history = PortfolioHistory::default();

        // Full window whose oldest point (the baseline) sits at 900
        history.push_aggregate(point(dec!(900), 0));
        for _ in 1..HISTORY_CAP {
            history.push_aggregate(point(dec!(1000), 0));
        }

        // This append still sees the 900 baseline, then evicts it
        let pnl = history.record(&[valued("BTC", dec!(1100))], Utc::now());
        assert_eq!(pnl, dec!(200));

        // The next point is measured against the new oldest (1000)
        let pnl = history.record(&[valued("BTC", dec!(1100))], Utc::now());
        assert_eq!(pnl, dec!(100));
    }

    #[test]
    fn test_aggregate_point_sums_all_balances() {
        let mut history = PortfolioHistory::default();
        history.record(
            &[valued("BTC", dec!(50000)), valued("ETH", dec!(20000))],
            Utc::now(),
        );

        assert_eq!(history.aggregate[0].total_value, dec!(70000));
    }
}
