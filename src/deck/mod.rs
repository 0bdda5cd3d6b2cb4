//! Deck assembly: decides which slides to add and in what order, and reports
//! the per-section counts back to the console layer.

pub mod details;
pub mod stats;
pub mod timeline;

use crate::config::Settings;
use crate::core::events::{self, ChangeEvent};
use crate::core::week::{current_week, next_week, previous_week};
use crate::dataset::Table;
use crate::errors::AppResult;
use crate::pptx::{layouts, PptxPackage};
use chrono::NaiveDate;

/// What got added, for the end-of-run summary.
#[derive(Debug, Default)]
pub struct DeckReport {
    pub splus1_count: usize,
    pub splus1_rows: usize,
    pub detail_slides: usize,
    pub current_count: usize,
    pub current_rows: usize,
    pub sminus1_count: usize,
}

/// Append every requested slide to the open package. Slide order: S+1
/// timeline, one detail slide per S+1 change, the S-1 statistics slides
/// when asked, then the current-week timeline when asked.
pub fn build_deck(
    pkg: &mut PptxPackage,
    table: &Table,
    events: &[ChangeEvent],
    settings: &Settings,
    reference: NaiveDate,
) -> AppResult<DeckReport> {
    let mut report = DeckReport::default();

    let next = next_week(reference);
    let mut splus1 = events::filter_to_window(events, &next);
    report.splus1_count = splus1.len();

    // S+1 goes on the template's first slide unless a layout was requested
    let splus1_part = match settings.splus1_layout_index {
        Some(_) => {
            let layout = layouts::choose_layout(pkg, settings.splus1_layout_index)?;
            pkg.add_slide(&layout.part)?
        }
        None => pkg.first_slide_part()?,
    };
    report.splus1_rows = timeline::render(
        pkg,
        &splus1_part,
        &format!("Changements S+1 ({})", next.label()),
        &splus1,
        &next,
        settings,
    )?;

    let detail_layout = layouts::choose_layout(pkg, settings.detail_layout_index)?;
    events::sort_for_details(&mut splus1);
    for event in &splus1 {
        details::render(pkg, &detail_layout.part, event, table, settings)?;
        report.detail_slides += 1;
    }

    if settings.sminus1_pie {
        let prev = previous_week(reference);
        let ended = events::ended_in_window(events, &prev);
        report.sminus1_count = ended.len();
        let layout = layouts::choose_layout(pkg, settings.sminus1_layout_index)?;
        stats::render(pkg, &layout.part, &ended, table, &prev, settings)?;
    }

    if settings.current_week {
        let cur = current_week(reference);
        let cur_events = events::filter_to_window(events, &cur);
        report.current_count = cur_events.len();
        let layout = layouts::choose_layout(pkg, settings.current_week_layout_index)?;
        let slide_part = pkg.add_slide(&layout.part)?;
        report.current_rows = timeline::render(
            pkg,
            &slide_part,
            &format!("Changements cette semaine ({})", cur.label()),
            &cur_events,
            &cur,
            settings,
        )?;
    }

    Ok(report)
}
