/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Returns GREY when the field is empty, and RESET otherwise.
pub fn color_for_optional_field<T: AsRef<str>>(value: Option<T>) -> &'static str {
    match value {
        Some(v) if !v.as_ref().trim().is_empty() => RESET,
        _ => GREY,
    }
}

/// Pending amount color:
/// \>0 → red (still to pay)
/// 0 → grey
pub fn color_for_pending(value: f64) -> &'static str {
    if value > 0.0 { RED } else { GREY }
}

/// Paid amount color:
/// \>0 → green
/// 0 → grey
pub fn color_for_paid(value: f64) -> &'static str {
    if value > 0.0 { GREEN } else { GREY }
}

/// Strike-through rendering for completed items.
pub fn strike(value: &str) -> String {
    format!("\x1b[9m{value}\x1b[29m")
}
