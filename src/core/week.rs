//! Monday-aligned week windows around a reference date.
//!
//! A window spans Monday 00:00:00.000000 through the following Sunday
//! 23:59:59.999999, i.e. seven days minus one microsecond. The S+1 deck uses
//! `next_week`, the statistics slides use `previous_week`.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl WeekWindow {
    fn from_monday(monday: NaiveDate) -> Self {
        let start = monday.and_hms_opt(0, 0, 0).unwrap();
        let end = start + Duration::days(7) - Duration::microseconds(1);
        Self { start, end }
    }

    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start <= t && t <= self.end
    }

    /// "dd/mm/YYYY → dd/mm/YYYY", used in slide titles and the console summary.
    pub fn label(&self) -> String {
        format!(
            "{} → {}",
            self.start.format("%d/%m/%Y"),
            self.end.format("%d/%m/%Y")
        )
    }
}

/// The most recent Monday, or `d` itself when it already is one.
pub fn monday_on_or_before(d: NaiveDate) -> NaiveDate {
    d - Duration::days(d.weekday().num_days_from_monday() as i64)
}

pub fn current_week(reference: NaiveDate) -> WeekWindow {
    WeekWindow::from_monday(monday_on_or_before(reference))
}

pub fn next_week(reference: NaiveDate) -> WeekWindow {
    WeekWindow::from_monday(monday_on_or_before(reference) + Duration::days(7))
}

pub fn previous_week(reference: NaiveDate) -> WeekWindow {
    WeekWindow::from_monday(monday_on_or_before(reference) - Duration::days(7))
}
