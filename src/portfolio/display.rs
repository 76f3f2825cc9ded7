//! Display utilities and formatters for the CLI output

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Table};
use owo_colors::OwoColorize;
use rust_decimal::Decimal;

use crate::portfolio::types::{HistoryPoint, ValuedBalance, ValuedPortfolio};
use crate::portfolio::window::{Window, WindowSummary};

/// Format an amount with precision scaled to its magnitude
pub fn format_amount(value: Decimal) -> String {
    let abs = value.abs();
    if abs.is_zero() {
        "0.00".to_string()
    } else if abs < Decimal::new(1, 2) {
        format!("{:.6}", value)
    } else if abs < Decimal::ONE {
        format!("{:.4}", value)
    } else {
        format!("{:.2}", value)
    }
}

pub fn format_currency(value: Decimal) -> String {
    format!("${}", format_amount(value))
}

/// Signed delta with color: green gains, red losses, dimmed zero
fn format_signed(value: Decimal, suffix: &str) -> String {
    let body = format!("{}{}{}", sign_prefix(value), format_amount(value), suffix);
    if value > Decimal::ZERO {
        body.green().to_string()
    } else if value < Decimal::ZERO {
        body.red().to_string()
    } else {
        body.dimmed().to_string()
    }
}

fn sign_prefix(value: Decimal) -> &'static str {
    if value > Decimal::ZERO {
        "+"
    } else {
        ""
    }
}

/// Render the balances table for one refreshed portfolio
pub fn render_portfolio(portfolio: &ValuedPortfolio) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        "Asset", "Total", "Price", "USD Value", "Change", "USD Change",
    ]);

    for balance in &portfolio.balances {
        table.add_row(balance_row(balance));
    }

    let mut output = table.to_string();
    output.push('\n');
    output.push_str(&format!(
        "Total: {}   PnL: {}\n",
        format_currency(portfolio.total_value).bold(),
        format_signed(portfolio.pnl, ""),
    ));
    output
}

fn balance_row(balance: &ValuedBalance) -> Vec<Cell> {
    let price = match balance.price {
        Some(price) => format_currency(price),
        // Unresolved is not the same as worthless
        None => "price n/a".dimmed().to_string(),
    };

    vec![
        Cell::new(&balance.asset),
        Cell::new(format_amount(balance.total)),
        Cell::new(price),
        Cell::new(format_currency(balance.usd_value)),
        Cell::new(format!(
            "{} ({})",
            format_signed(balance.change, ""),
            format_signed(balance.change_percent, "%"),
        )),
        Cell::new(format_signed(balance.usd_change, "")),
    ]
}

/// Render the windowed aggregate series as a table
pub fn render_history(points: &[HistoryPoint], window: Window) -> String {
    if points.is_empty() {
        return format!("No history in the last {} yet.\n", window);
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Time", "Total Value", "PnL"]);

    for point in points {
        table.add_row(vec![
            Cell::new(&point.time),
            Cell::new(format_currency(point.total_value)),
            Cell::new(format_signed(point.pnl, "")),
        ]);
    }

    format!("{}\n", table)
}

/// One-line summary for a window, e.g. "1h: $50600.00 +600.00 (+1.20%)"
pub fn render_summary(summary: &WindowSummary, window: Window) -> String {
    format!(
        "{}: {} {} ({})",
        window,
        format_currency(summary.current).bold(),
        format_signed(summary.delta, ""),
        format_signed(summary.delta_percent, "%"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_amount_scales_precision() {
        assert_eq!(format_amount(dec!(0)), "0.00");
        assert_eq!(format_amount(dec!(0.00123456)), "0.001235");
        assert_eq!(format_amount(dec!(0.1234)), "0.1234");
        assert_eq!(format_amount(dec!(1234.5678)), "1234.57");
    }

    #[test]
    fn test_render_portfolio_marks_missing_price() {
        let portfolio = ValuedPortfolio {
            balances: vec![ValuedBalance {
                asset: "MYSTERY".to_string(),
                free: dec!(1),
                locked: dec!(0),
                total: dec!(1),
                price: None,
                usd_value: dec!(0),
                change: dec!(0),
                change_percent: dec!(0),
                usd_change: dec!(0),
            }],
            total_value: dec!(0),
            pnl: dec!(0),
            refreshed_at: Utc::now(),
        };

        let output = render_portfolio(&portfolio);
        assert!(output.contains("price n/a"));
        assert!(output.contains("MYSTERY"));
    }

    #[test]
    fn test_render_history_empty_window() {
        let output = render_history(&[], Window::H1);
        assert!(output.contains("1h"));
    }
}
