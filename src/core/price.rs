//! Price input normalizer.
//!
//! Folds whatever a person types into a price field (Brazilian locale
//! first) into the canonical decimal stored everywhere else. Total by
//! contract: bad input becomes 0.0, never an error.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Leading currency markers: "R$ 12", "US$ 5", "$3", "€ 9".
static CURRENCY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i:r\$|us\$|\$|€|£)").unwrap());

/// Normalize a raw price string.
///
/// Rules, applied in order:
/// - `None`, empty or blank input → `0.0`
/// - currency prefix and whitespace are stripped
/// - a comma is the decimal separator; any dots next to it are thousands
///   separators ("1.200,50" → 1200.5)
/// - with no comma and several dots, every dot is a thousands separator
///   ("1.200.300" → 1200300.0)
/// - with no comma and a single dot, the dot is the decimal point ("10.50")
/// - anything that still fails to parse → `0.0`
///
/// The result is clamped at zero, and the function is idempotent: feeding
/// a canonical value back in returns the same value.
pub fn normalize_price(input: Option<&str>) -> f64 {
    let Some(raw) = input else {
        return 0.0;
    };
    if raw.trim().is_empty() {
        return 0.0;
    }

    let cleaned: String = CURRENCY_PREFIX
        .replace(raw.trim(), "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let canonical = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else if cleaned.matches('.').count() > 1 {
        cleaned.replace('.', "")
    } else {
        cleaned
    };

    match canonical.parse::<f64>() {
        Ok(v) => clamp_price(v),
        Err(_) => 0.0,
    }
}

/// Normalize a wire value: numbers pass through (NaN and negatives fold
/// to zero), strings go through [`normalize_price`], anything else is
/// zero. Backends have been seen returning numeric columns as text, so
/// every price read off the wire goes through here.
pub fn normalize_price_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => clamp_price(n.as_f64().unwrap_or(0.0)),
        Value::String(s) => normalize_price(Some(s)),
        _ => 0.0,
    }
}

/// Fold non-finite and negative values to zero.
pub(crate) fn clamp_price(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}
