//! Formatting utilities for CLI outputs.

use chrono::{DateTime, Local, Utc};

pub fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

/// Money, rendered the way the dashboard shows it: "R$ 1200.50".
pub fn format_money(value: f64) -> String {
    format!("R$ {:.2}", value)
}

/// Chat timestamp in local time, e.g. "14:32".
pub fn format_clock(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M").to_string()
}

/// Full local date and time, e.g. "2026-08-23 14:32".
pub fn format_date_time(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Local date, e.g. "2026-08-23".
pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d").to_string()
}
