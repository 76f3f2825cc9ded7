//! USD price resolution over the traded-pair graph
//!
//! Not every held asset has a direct USD market, so resolution runs as a
//! fixed sequence of passes where the first pass to price an asset wins:
//!
//! 1. direct stable pairs (`*USDT`, `*BUSD`)
//! 2. stable-coin identities (USDT, USDC, BUSD)
//! 3. staked-asset aliasing (`LD*` earn balances priced as their base asset)
//! 4. cross-quote conversion through the BTC/ETH/BNB anchors
//!
//! Assets that survive every pass unpriced stay absent from the index —
//! absence means "price unknown", which is not the same as a zero price.

use rust_decimal::Decimal;
use std::collections::HashSet;

use crate::exchange::types::TickerPrice;
use crate::portfolio::types::PriceIndex;

/// Prefix the exchange puts on locked "earn" variants of a base asset
const STAKED_PREFIX: &str = "LD";

/// Anchor symbols quoted in USDT, extracted before any pass runs
const BTC_USDT: &str = "BTCUSDT";
const ETH_USDT: &str = "ETHUSDT";
const BNB_USDT: &str = "BNBUSDT";
const BUSD_USDT: &str = "BUSDUSDT";

/// Resolve a USD price for every asset reachable through the pair graph.
///
/// `held_assets` is consulted only for staked aliasing; tickers drive every
/// other pass.
pub fn resolve_prices(tickers: &[TickerPrice], held_assets: &HashSet<String>) -> PriceIndex {
    let mut index = PriceIndex::new();

    let anchors = Anchors::extract(tickers);

    // Pass A: direct stable pairs
    for ticker in tickers {
        if let Some(base) = ticker.symbol.strip_suffix("USDT") {
            if !base.is_empty() && !index.contains_key(base) {
                index.insert(base.to_string(), ticker.price);
            }
        } else if let Some(base) = ticker.symbol.strip_suffix("BUSD") {
            if !base.is_empty() && !index.contains_key(base) {
                index.insert(base.to_string(), ticker.price * anchors.busd);
            }
        }
    }

    // Stable-coin identities, applied after pass A so a spurious self-pair
    // (e.g. BUSDUSDT priced off-peg) cannot shadow them
    index.insert("USDT".to_string(), Decimal::ONE);
    index.insert("USDC".to_string(), Decimal::ONE);
    index.insert("BUSD".to_string(), anchors.busd);

    // Pass B: staked balances alias to their base asset
    for asset in held_assets {
        if !asset.starts_with(STAKED_PREFIX) || index.contains_key(asset) {
            continue;
        }
        let base = &asset[STAKED_PREFIX.len()..];
        if let Some(&base_price) = index.get(base) {
            index.insert(asset.clone(), base_price);
        }
    }

    // Pass C: cross-quote through the anchors, BTC pairs before ETH before
    // BNB when an asset trades against more than one. An anchor of zero
    // means no USDT market existed for it this snapshot and disables that
    // path
    for (quote, anchor) in [
        ("BTC", anchors.btc),
        ("ETH", anchors.eth),
        ("BNB", anchors.bnb),
    ] {
        if anchor <= Decimal::ZERO {
            continue;
        }
        for ticker in tickers {
            if let Some(base) = ticker.symbol.strip_suffix(quote) {
                if !base.is_empty() && !index.contains_key(base) {
                    index.insert(base.to_string(), ticker.price * anchor);
                }
            }
        }
    }

    index
}

/// USDT-quoted conversion multipliers for the cross-quote pass
struct Anchors {
    btc: Decimal,
    eth: Decimal,
    bnb: Decimal,
    busd: Decimal,
}

impl Anchors {
    fn extract(tickers: &[TickerPrice]) -> Self {
        let mut anchors = Self {
            btc: Decimal::ZERO,
            eth: Decimal::ZERO,
            bnb: Decimal::ZERO,
            // BUSD trades at par unless the snapshot says otherwise
            busd: Decimal::ONE,
        };

        for ticker in tickers {
            match ticker.symbol.as_str() {
                BTC_USDT => anchors.btc = ticker.price,
                ETH_USDT => anchors.eth = ticker.price,
                BNB_USDT => anchors.bnb = ticker.price,
                BUSD_USDT => anchors.busd = ticker.price,
                _ => {}
            }
        }

        anchors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ticker(symbol: &str, price: Decimal) -> TickerPrice {
        TickerPrice {
            symbol: symbol.to_string(),
            price,
        }
    }

    fn held(assets: &[&str]) -> HashSet<String> {
        assets.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_direct_usdt_pair() {
        let tickers = vec![ticker("BTCUSDT", dec!(50000))];
        let index = resolve_prices(&tickers, &held(&[]));
        assert_eq!(index["BTC"], dec!(50000));
    }

    #[test]
    fn test_busd_pair_converts_through_busd_anchor() {
        let tickers = vec![
            ticker("BUSDUSDT", dec!(0.999)),
            ticker("CAKEBUSD", dec!(2.0)),
        ];
        let index = resolve_prices(&tickers, &held(&[]));
        assert_eq!(index["CAKE"], dec!(1.998));
        // The identity seed wins over the BUSDUSDT self-pair from pass A
        assert_eq!(index["BUSD"], dec!(0.999));
    }

    #[test]
    fn test_stable_seeds_always_present() {
        let index = resolve_prices(&[], &held(&[]));
        assert_eq!(index.len(), 3);
        assert_eq!(index["USDT"], Decimal::ONE);
        assert_eq!(index["USDC"], Decimal::ONE);
        assert_eq!(index["BUSD"], Decimal::ONE);
    }

    #[test]
    fn test_staked_alias_resolves_to_base_price() {
        let tickers = vec![ticker("BNBUSDT", dec!(300))];
        let index = resolve_prices(&tickers, &held(&["LDBNB"]));
        assert_eq!(index["LDBNB"], dec!(300));
    }

    #[test]
    fn test_staked_alias_without_base_price_stays_absent() {
        let index = resolve_prices(&[], &held(&["LDFOO"]));
        assert!(!index.contains_key("LDFOO"));
    }

    #[test]
    fn test_cross_quote_through_btc() {
        let tickers = vec![
            ticker("BTCUSDT", dec!(50000)),
            ticker("XMRBTC", dec!(0.004)),
        ];
        let index = resolve_prices(&tickers, &held(&[]));
        assert_eq!(index["XMR"], dec!(200.000));
    }

    #[test]
    fn test_cross_quote_priority_eth_then_bnb() {
        let tickers = vec![
            ticker("ETHUSDT", dec!(2000)),
            ticker("BNBUSDT", dec!(300)),
            ticker("MATICETH", dec!(0.0005)),
            ticker("TWTBNB", dec!(0.01)),
        ];
        let index = resolve_prices(&tickers, &held(&[]));
        assert_eq!(index["MATIC"], dec!(1.0000));
        assert_eq!(index["TWT"], dec!(3.00));
    }

    #[test]
    fn test_btc_quote_beats_eth_quote_regardless_of_ticker_order() {
        // RUNE trades against both ETH and BTC; the BTC market wins even
        // though the ETH ticker comes first in the payload
        let tickers = vec![
            ticker("BTCUSDT", dec!(50000)),
            ticker("ETHUSDT", dec!(2000)),
            ticker("RUNEETH", dec!(0.003)),
            ticker("RUNEBTC", dec!(0.0001)),
        ];
        let index = resolve_prices(&tickers, &held(&[]));
        assert_eq!(index["RUNE"], dec!(5.0000));
    }

    #[test]
    fn test_zero_anchor_disables_conversion_path() {
        // No BTCUSDT market this snapshot: BTC-quoted pairs cannot resolve
        let tickers = vec![ticker("XMRBTC", dec!(0.004))];
        let index = resolve_prices(&tickers, &held(&[]));
        assert!(!index.contains_key("XMR"));
    }

    #[test]
    fn test_first_resolved_wins_over_cross_quote() {
        // Direct USDT pair beats the BTC-quoted conversion for the same asset
        let tickers = vec![
            ticker("BTCUSDT", dec!(50000)),
            ticker("SOLUSDT", dec!(150)),
            ticker("SOLBTC", dec!(0.0031)),
        ];
        let index = resolve_prices(&tickers, &held(&[]));
        assert_eq!(index["SOL"], dec!(150));
    }

    #[test]
    fn test_unresolvable_asset_is_absent_not_zero() {
        let tickers = vec![ticker("BTCUSDT", dec!(50000))];
        let index = resolve_prices(&tickers, &held(&["MYSTERY"]));
        assert!(!index.contains_key("MYSTERY"));
    }
}
