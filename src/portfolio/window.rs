//! Relative time-window slicing and display summaries

use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bounded relative time range used to slice a series for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Window {
    #[value(name = "1m")]
    M1,
    #[value(name = "5m")]
    M5,
    #[value(name = "15m")]
    M15,
    #[value(name = "30m")]
    M30,
    #[value(name = "1h")]
    H1,
    #[value(name = "4h")]
    H4,
    #[value(name = "1d")]
    D1,
    #[value(name = "all")]
    All,
}

impl Window {
    /// Duration covered by the window; None for the unbounded case
    pub fn duration(self) -> Option<Duration> {
        match self {
            Window::M1 => Some(Duration::minutes(1)),
            Window::M5 => Some(Duration::minutes(5)),
            Window::M15 => Some(Duration::minutes(15)),
            Window::M30 => Some(Duration::minutes(30)),
            Window::H1 => Some(Duration::hours(1)),
            Window::H4 => Some(Duration::hours(4)),
            Window::D1 => Some(Duration::days(1)),
            Window::All => None,
        }
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Window::M1 => "1m",
            Window::M5 => "5m",
            Window::M15 => "15m",
            Window::M30 => "30m",
            Window::H1 => "1h",
            Window::H4 => "4h",
            Window::D1 => "1d",
            Window::All => "all",
        };
        write!(f, "{}", label)
    }
}

/// Current/previous/delta summary over a filtered series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSummary {
    pub current: Decimal,
    pub previous: Decimal,
    pub delta: Decimal,
    pub delta_percent: Decimal,
}

/// Keep only points at or after `now - window`, preserving order.
///
/// `now` is a parameter so callers (and tests) control the clock.
pub fn filter_window<T: Clone>(
    points: &[T],
    window: Window,
    now: DateTime<Utc>,
    timestamp_of: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<T> {
    match window.duration() {
        None => points.to_vec(),
        Some(duration) => {
            let cutoff = now - duration;
            points
                .iter()
                .filter(|p| timestamp_of(p) >= cutoff)
                .cloned()
                .collect()
        }
    }
}

/// Summarize a filtered series of values (usd values or totals).
///
/// A series shorter than two points has previous == current, mirroring the
/// first-refresh zero-delta boundary of the valuation engine.
pub fn summarize(values: &[Decimal]) -> WindowSummary {
    let current = values.last().copied().unwrap_or(Decimal::ZERO);
    let previous = if values.len() >= 2 {
        values[0]
    } else {
        current
    };

    let delta = current - previous;
    let delta_percent = if previous > Decimal::ZERO {
        delta / previous * Decimal::from(100)
    } else {
        Decimal::ZERO
    };

    WindowSummary {
        current,
        previous,
        delta,
        delta_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[derive(Clone)]
    struct Stamped {
        at: DateTime<Utc>,
    }

    fn stamped(now: DateTime<Utc>, minutes_ago: i64) -> Stamped {
        Stamped {
            at: now - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn test_one_hour_window_drops_older_points() {
        let now = Utc::now();
        let points = vec![stamped(now, 120), stamped(now, 30), stamped(now, 0)];

        let filtered = filter_window(&points, Window::H1, now, |p| p.at);

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].at, now - Duration::minutes(30));
        assert_eq!(filtered[1].at, now);
    }

    #[test]
    fn test_all_window_is_identity() {
        let now = Utc::now();
        let points = vec![stamped(now, 100_000), stamped(now, 0)];

        let filtered = filter_window(&points, Window::All, now, |p| p.at);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let now = Utc::now();
        let points = vec![stamped(now, 60)];

        let filtered = filter_window(&points, Window::H1, now, |p| p.at);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_summarize_single_element_has_zero_delta() {
        let summary = summarize(&[dec!(500)]);
        assert_eq!(summary.current, dec!(500));
        assert_eq!(summary.previous, dec!(500));
        assert_eq!(summary.delta, Decimal::ZERO);
        assert_eq!(summary.delta_percent, Decimal::ZERO);
    }

    #[test]
    fn test_summarize_delta_between_first_and_last() {
        let summary = summarize(&[dec!(1000), dec!(1100), dec!(1250)]);
        assert_eq!(summary.current, dec!(1250));
        assert_eq!(summary.previous, dec!(1000));
        assert_eq!(summary.delta, dec!(250));
        assert_eq!(summary.delta_percent, dec!(25));
    }

    #[test]
    fn test_summarize_zero_previous_pins_percent_to_zero() {
        let summary = summarize(&[dec!(0), dec!(100)]);
        assert_eq!(summary.delta, dec!(100));
        assert_eq!(summary.delta_percent, Decimal::ZERO);
    }

    #[test]
    fn test_summarize_empty_series() {
        let summary = summarize(&[]);
        assert_eq!(summary.current, Decimal::ZERO);
        assert_eq!(summary.delta, Decimal::ZERO);
    }

    #[test]
    fn test_window_labels() {
        assert_eq!(Window::H1.to_string(), "1h");
        assert_eq!(Window::All.to_string(), "all");
    }
}
