//! Builds typed change events from the harmonized table and filters them
//! against week windows.

use crate::core::classify::ChangeType;
use crate::core::week::WeekWindow;
use crate::dataset::harmonize::columns;
use crate::dataset::Table;
use crate::errors::{AppError, AppResult};
use crate::utils::date::parse_flexible;
use chrono::NaiveDateTime;

#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub id: String,
    pub summary: String,
    pub config_item: String,
    pub category: ChangeType,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Index of the source row in the harmonized table; the detail slides
    /// read the long-form fields straight from there.
    pub row_index: usize,
}

/// Parse every row into a ChangeEvent. A date that no format recognizes is
/// fatal for the whole run; a deck silently missing a scheduled change is
/// worse than a clear diagnostic.
pub fn build_events(table: &Table) -> AppResult<Vec<ChangeEvent>> {
    let mut events = Vec::with_capacity(table.rows.len());

    for (i, _) in table.rows.iter().enumerate() {
        let start = parse_cell(table, i, columns::PLANNED_START)?;
        let end = parse_cell(table, i, columns::PLANNED_END)?;

        events.push(ChangeEvent {
            id: table.get(i, columns::ID).trim().to_string(),
            summary: table.get(i, columns::SUMMARY).trim().to_string(),
            config_item: table.get(i, columns::CONFIG_ITEM).trim().to_string(),
            category: ChangeType::from_label(table.get(i, columns::TYPE)),
            start,
            end,
            row_index: i,
        });
    }

    Ok(events)
}

fn parse_cell(table: &Table, row: usize, column: &str) -> AppResult<NaiveDateTime> {
    let raw = table.get(row, column);
    parse_flexible(raw).ok_or_else(|| AppError::DateFormat {
        value: raw.to_string(),
        column: column.to_string(),
        // +2: header line plus 1-based counting, matching what users see in
        // their spreadsheet application
        row: row + 2,
    })
}

/// Inclusive interval overlap: an event spanning a week boundary belongs to
/// both adjacent windows, and touching a boundary exactly is enough.
pub fn filter_to_window(events: &[ChangeEvent], window: &WeekWindow) -> Vec<ChangeEvent> {
    events
        .iter()
        .filter(|e| e.start <= window.end && e.end >= window.start)
        .cloned()
        .collect()
}

/// Events whose *end* falls inside the window; the S-1 statistics criterion.
pub fn ended_in_window(events: &[ChangeEvent], window: &WeekWindow) -> Vec<ChangeEvent> {
    events
        .iter()
        .filter(|e| window.contains(e.end))
        .cloned()
        .collect()
}

/// Order used for the detail slides: start ascending, then identifier.
pub fn sort_for_details(events: &mut [ChangeEvent]) {
    events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
}
