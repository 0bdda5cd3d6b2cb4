//! Timeline packing engine.
//!
//! Places each change event on a bounded 7-day grid: a horizontal extent
//! derived from its clamped start/end instants (day column plus sub-day
//! fraction, widened to a minimum legible width), and a row index chosen by
//! greedy first-fit so that no two events sharing a row overlap
//! horizontally. Deterministic for identical input sets regardless of input
//! order; never fails, never limits the number of rows.

use crate::core::events::ChangeEvent;
use crate::core::week::WeekWindow;
use chrono::{NaiveDateTime, Timelike};

/// Horizontal geometry of the rendered grid, in whatever unit the renderer
/// works in (EMUs in practice; the engine only needs ratios).
#[derive(Debug, Clone, Copy)]
pub struct GridMetrics {
    pub day_count: usize,
    /// Width of one day column.
    pub col_width: f64,
    /// Gap between adjacent day columns.
    pub col_gap: f64,
    /// Minimum box width; short events are widened to this so their label
    /// stays legible.
    pub min_width: f64,
}

#[derive(Debug, Clone)]
pub struct PlacedEvent {
    pub event: ChangeEvent,
    /// Day-of-week columns occupied after clamping, 0 = Monday.
    pub day_start: usize,
    pub day_end: usize,
    /// Sub-day offsets within the start/end columns, in [0, 1].
    pub frac_start: f64,
    pub frac_end: f64,
    /// Horizontal extent on the linear grid axis, in `GridMetrics` units.
    pub left: f64,
    pub right: f64,
    /// Vertical lane assigned by first-fit.
    pub row: usize,
    /// True when the extent sits at the enforced minimum; the renderer drops
    /// the summary text on such narrow boxes.
    pub at_min_width: bool,
}

impl PlacedEvent {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }
}

fn clamp_to_window(t: NaiveDateTime, window: &WeekWindow) -> NaiveDateTime {
    if t < window.start {
        window.start
    } else if t > window.end {
        window.end
    } else {
        t
    }
}

/// Time-of-day as a fraction of 86400 seconds, microsecond precision.
fn day_fraction(t: NaiveDateTime) -> f64 {
    let secs = t.num_seconds_from_midnight() as f64;
    let micros = (t.nanosecond() / 1_000) as f64 / 1_000_000.0;
    ((secs + micros) / 86_400.0).clamp(0.0, 1.0)
}

/// Assign every event a horizontal extent and a row.
///
/// Events are processed by (start, end, id) ascending; that order alone
/// determines row assignment, so two runs over the same set are identical
/// even if the caller shuffles the input.
pub fn pack(events: &[ChangeEvent], window: &WeekWindow, metrics: &GridMetrics) -> Vec<PlacedEvent> {
    let mut ordered: Vec<ChangeEvent> = events.to_vec();
    ordered.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| a.end.cmp(&b.end))
            .then_with(|| a.id.cmp(&b.id))
    });

    // Occupied horizontal intervals per row, in grid units.
    let mut rows: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut placed = Vec::with_capacity(ordered.len());
    let last_day = metrics.day_count.saturating_sub(1);

    for event in ordered {
        let start = clamp_to_window(event.start, window);
        // end < start is tolerated as malformed input, not rejected
        let end = clamp_to_window(event.end.max(event.start), window);

        let day_start = (day_offset(start, window) as usize).min(last_day);
        let mut day_end = (day_offset(end, window) as usize).min(last_day);
        if day_end < day_start {
            day_end = day_start;
        }

        let frac_start = day_fraction(start);
        let frac_end = day_fraction(end);

        let stride = metrics.col_width + metrics.col_gap;
        let left = day_start as f64 * stride + frac_start * metrics.col_width;
        let mut right = day_end as f64 * stride + frac_end * metrics.col_width;
        if right - left < metrics.min_width {
            right = left + metrics.min_width;
        }
        let at_min_width = right - left <= metrics.min_width;

        // First row whose occupied intervals leave this extent free.
        // Half-open test: [a,b) and [c,d) overlap iff a < d && c < b.
        let mut row_index = None;
        for (idx, segments) in rows.iter_mut().enumerate() {
            let collides = segments.iter().any(|&(a, b)| left < b && a < right);
            if !collides {
                segments.push((left, right));
                row_index = Some(idx);
                break;
            }
        }
        let row = row_index.unwrap_or_else(|| {
            rows.push(vec![(left, right)]);
            rows.len() - 1
        });

        placed.push(PlacedEvent {
            event,
            day_start,
            day_end,
            frac_start,
            frac_end,
            left,
            right,
            row,
            at_min_width,
        });
    }

    placed
}

fn day_offset(t: NaiveDateTime, window: &WeekWindow) -> i64 {
    (t - window.start).num_days().max(0)
}

/// Number of rows a packed set occupies (0 for an empty set).
pub fn row_count(placed: &[PlacedEvent]) -> usize {
    placed.iter().map(|p| p.row + 1).max().unwrap_or(0)
}
