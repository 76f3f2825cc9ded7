//! Exchange REST collaborator
//!
//! The tracker core treats the exchange as an opaque data source returning
//! balances and tickers. Everything here is wire plumbing: request signing,
//! payload decoding, timeouts.

pub mod client;
pub mod types;

pub use client::ExchangeClient;
pub use types::{RawBalance, TickerPrice};
