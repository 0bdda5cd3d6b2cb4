//! Formatting utilities used for console and slide text.

use chrono::NaiveDateTime;

/// Date-time as shown inside timeline boxes and detail badges.
pub fn format_slide_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%d/%m/%Y %H:%M").to_string()
}

/// Percentage with no decimals, e.g. "42%". Zero total yields "0%".
pub fn percent(part: usize, total: usize) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{}%", (part as f64 / total as f64 * 100.0).round() as i64)
}
