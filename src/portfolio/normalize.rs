//! Raw balance normalization
//!
//! The account endpoint reports every listed asset, almost all of them with
//! zero balances. Normalization keeps only assets actually held and orders
//! them largest first so the display and the per-asset history stay stable.

use rust_decimal::Decimal;

use crate::exchange::types::RawBalance;
use crate::portfolio::types::NormalizedBalance;

/// Drop empty entries, derive totals, and sort descending by total.
///
/// The sort is stable: assets with equal totals keep their input order.
pub fn normalize(raw: Vec<RawBalance>) -> Vec<NormalizedBalance> {
    let mut balances: Vec<NormalizedBalance> = raw
        .into_iter()
        .filter(|b| b.free > Decimal::ZERO || b.locked > Decimal::ZERO)
        .map(|b| NormalizedBalance {
            total: b.free + b.locked,
            asset: b.asset,
            free: b.free,
            locked: b.locked,
        })
        .filter(|b| b.total > Decimal::ZERO)
        .collect();

    balances.sort_by(|a, b| b.total.cmp(&a.total));
    balances
}
