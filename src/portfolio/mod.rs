//! Portfolio valuation core
//!
//! Pure functions (normalize → resolve → value) feed a bounded history and
//! a persisted previous-snapshot comparison. The stateful shell around them
//! lives in [`service`]; everything else takes its inputs explicitly and is
//! unit-testable in isolation.

pub mod display;
pub mod history;
pub mod normalize;
pub mod prices;
pub mod service;
pub mod storage;
pub mod types;
pub mod valuation;
pub mod window;

pub use history::{PortfolioHistory, HISTORY_CAP};
pub use normalize::normalize;
pub use prices::resolve_prices;
pub use service::{start_portfolio_service, PortfolioHandle, PortfolioService};
pub use storage::PortfolioStorage;
pub use types::*;
pub use valuation::value_balances;
pub use window::{filter_window, summarize, Window, WindowSummary};
