//! Valuation of normalized balances against the resolved price index
//!
//! Pure over its inputs; persisting the resulting snapshot is the caller's
//! job. An asset without a resolved price values at zero but keeps
//! `price: None` so the display can say "price unavailable" instead of
//! "$0.00".

use rust_decimal::Decimal;

use crate::portfolio::types::{
    NormalizedBalance, PreviousBalance, PreviousSnapshot, PriceIndex, ValuedBalance,
};

/// Combine balances with prices and diff them against the previous snapshot.
///
/// With no prior entry for an asset, previous defaults to current, so the
/// first refresh reports zero deltas rather than a spurious jump.
pub fn value_balances(
    balances: &[NormalizedBalance],
    prices: &PriceIndex,
    previous: &PreviousSnapshot,
) -> Vec<ValuedBalance> {
    balances
        .iter()
        .map(|balance| {
            let price = prices.get(&balance.asset).copied();
            let usd_value = balance.total * price.unwrap_or(Decimal::ZERO);

            let prev = previous
                .balances
                .get(&balance.asset)
                .copied()
                .unwrap_or(PreviousBalance {
                    total: balance.total,
                    usd_value,
                });

            let change = balance.total - prev.total;
            // A previous total of zero reports 0%, never a division by zero
            let change_percent = if prev.total > Decimal::ZERO {
                change / prev.total * Decimal::from(100)
            } else {
                Decimal::ZERO
            };

            ValuedBalance {
                asset: balance.asset.clone(),
                free: balance.free,
                locked: balance.locked,
                total: balance.total,
                price,
                usd_value,
                change,
                change_percent,
                usd_change: usd_value - prev.usd_value,
            }
        })
        .collect()
}
