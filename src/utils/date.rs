//! Flexible date/datetime parsing for change exports.
//! Tries an ordered list of explicit formats, then a day-first heuristic,
//! then an Excel serial-number fallback for values coming out of XLSX cells.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

/// Formats carrying a time-of-day component, tried first.
const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%y %H:%M",
    "%d/%m/%Y %H:%M",
    "%d/%m/%y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Date-only formats; the result is midnight of that day.
const DATE_FORMATS: &[&str] = &["%d/%m/%y", "%d/%m/%Y", "%Y-%m-%d"];

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parse a date or date+time accepting the formats seen in real exports.
/// Returns None when nothing matches; callers decide how fatal that is.
pub fn parse_flexible(s: &str) -> Option<NaiveDateTime> {
    let text = s.trim();
    if text.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    heuristic_dayfirst(text).or_else(|| excel_serial(text))
}

/// Last-resort day-first parse: d/m/y with '/', '-' or '.' separators and an
/// optional HH:MM[:SS] tail. Two-digit years map to 2000-2099.
fn heuristic_dayfirst(text: &str) -> Option<NaiveDateTime> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{2,4})(?:[ T](\d{1,2}):(\d{2})(?::(\d{2}))?)?$",
        )
        .unwrap()
    });

    let caps = re.captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let mut year: i32 = caps[3].parse().ok()?;
    if year < 100 {
        year += 2000;
    }

    let hour: u32 = caps.get(4).map_or(Some(0), |m| m.as_str().parse().ok())?;
    let minute: u32 = caps.get(5).map_or(Some(0), |m| m.as_str().parse().ok())?;
    let second: u32 = caps.get(6).map_or(Some(0), |m| m.as_str().parse().ok())?;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

/// Excel stores datetimes as days since 1899-12-30; XLSX cells without a
/// style-aware reader surface them as bare numbers like "45907.5".
fn excel_serial(text: &str) -> Option<NaiveDateTime> {
    let serial: f64 = text.parse().ok()?;
    // Plausible window: 1955..2064. Anything else is more likely a plain number.
    if !(20_000.0..60_000.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.floor() as i64;
    let secs = ((serial - serial.floor()) * 86_400.0).round() as i64;
    Some(epoch + Duration::days(days) + Duration::seconds(secs))
}

/// Strict YYYY-MM-DD parse for the --ref-date flag.
pub fn parse_ref_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn parses_explicit_formats() {
        assert_eq!(parse_flexible("09/09/2025 14:30"), Some(dt(2025, 9, 9, 14, 30, 0)));
        assert_eq!(parse_flexible("09/09/25"), Some(dt(2025, 9, 9, 0, 0, 0)));
        assert_eq!(parse_flexible("2025-09-09T14:30:15"), Some(dt(2025, 9, 9, 14, 30, 15)));
        assert_eq!(parse_flexible("2025-09-09"), Some(dt(2025, 9, 9, 0, 0, 0)));
    }

    #[test]
    fn heuristic_handles_dots_and_short_years() {
        assert_eq!(parse_flexible("9.9.25 8:05"), Some(dt(2025, 9, 9, 8, 5, 0)));
        assert_eq!(parse_flexible("31-12-2024"), Some(dt(2024, 12, 31, 0, 0, 0)));
    }

    #[test]
    fn excel_serial_fallback() {
        // 45908 = 2025-09-08; .5 adds twelve hours
        assert_eq!(parse_flexible("45908.5"), Some(dt(2025, 9, 8, 12, 0, 0)));
        assert_eq!(parse_flexible("12"), None);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_flexible(""), None);
        assert_eq!(parse_flexible("   "), None);
        assert_eq!(parse_flexible("not a date"), None);
        assert_eq!(parse_flexible("99/99/2025"), None);
    }

    #[test]
    fn ref_date_is_strict() {
        assert_eq!(parse_ref_date("2025-09-09"), NaiveDate::from_ymd_opt(2025, 9, 9));
        assert_eq!(parse_ref_date("09/09/2025"), None);
    }
}
