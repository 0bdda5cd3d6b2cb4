//! Weekly timeline slide: a 7-column day grid, one colored box per change,
//! rows assigned by the packing engine.

use crate::config::Settings;
use crate::core::events::ChangeEvent;
use crate::core::pack::{self, GridMetrics, PlacedEvent};
use crate::core::week::WeekWindow;
use crate::errors::AppResult;
use crate::pptx::slide::{cm, Paragraph, Rect, SlideBuilder, TextRun};
use crate::pptx::PptxPackage;
use chrono::Duration;

const MARGIN_LEFT: f64 = 1.0;
const MARGIN_RIGHT: f64 = 1.0;
const GRID_TOP: f64 = 2.4;
const HEADER_HEIGHT: f64 = 0.7;
const COL_GAP: f64 = 0.15;
const BOX_HEIGHT: f64 = 1.4;
const ROW_GAP: f64 = 0.15;
const MIN_BOX_WIDTH: f64 = 5.0;
const DAY_COUNT: usize = 7;

const DAY_NAMES: [&str; 7] = [
    "Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi", "Dimanche",
];

/// Render the timeline for `window` onto an existing slide part and return
/// the number of rows the packed set occupied. The caller picks the slide:
/// the template's first slide for S+1 by default, a freshly added one
/// otherwise.
pub fn render(
    pkg: &mut PptxPackage,
    slide_part: &str,
    title: &str,
    events: &[ChangeEvent],
    window: &WeekWindow,
    settings: &Settings,
) -> AppResult<usize> {
    let slide_width = pkg.slide_width;

    let usable = slide_width - cm(MARGIN_LEFT) - cm(MARGIN_RIGHT);
    let col_gap = cm(COL_GAP);
    let col_width = (usable - (DAY_COUNT as i64 - 1) * col_gap) / DAY_COUNT as i64;
    let metrics = GridMetrics {
        day_count: DAY_COUNT,
        col_width: col_width as f64,
        col_gap: col_gap as f64,
        min_width: cm(MIN_BOX_WIDTH) as f64,
    };
    let placed = pack::pack(events, window, &metrics);
    let rows = pack::row_count(&placed);

    let mut builder = SlideBuilder::new(pkg, slide_part);
    builder.title(slide_width, title);
    draw_day_headers(&mut builder, window, col_width, col_gap);
    for p in &placed {
        draw_event_box(&mut builder, p, settings)?;
    }
    builder.commit()?;

    Ok(rows)
}

fn draw_day_headers(builder: &mut SlideBuilder, window: &WeekWindow, col_width: i64, col_gap: i64) {
    for day in 0..DAY_COUNT {
        let date = (window.start + Duration::days(day as i64)).date();
        let label = format!("{} {}", DAY_NAMES[day], date.format("%d/%m"));
        let rect = Rect {
            x: cm(MARGIN_LEFT) + day as i64 * (col_width + col_gap),
            y: cm(GRID_TOP),
            cx: col_width,
            cy: cm(HEADER_HEIGHT),
        };
        builder.textbox(rect, &[Paragraph::of(vec![TextRun::plain(label, 10).bold()])]);
    }
}

fn draw_event_box(
    builder: &mut SlideBuilder,
    placed: &PlacedEvent,
    settings: &Settings,
) -> AppResult<()> {
    let event = &placed.event;
    let rect = Rect {
        x: cm(MARGIN_LEFT) + placed.left.round() as i64,
        y: cm(GRID_TOP + HEADER_HEIGHT) + placed.row as i64 * cm(BOX_HEIGHT + ROW_GAP),
        cx: placed.width().round() as i64,
        cy: cm(BOX_HEIGHT),
    };

    let rid = builder.hyperlink(&settings.hyperlink_for(&event.id))?;
    let mut first_line = vec![TextRun::plain(&event.id, 8)
        .bold()
        .colored("FFFFFF")
        .linked(rid)];
    // narrow boxes drop the summary and show the configuration item instead
    if !placed.at_min_width && !event.summary.is_empty() {
        first_line.push(TextRun::plain(format!(" – {}", event.summary), 8).colored("FFFFFF"));
    }

    let mut paragraphs = vec![Paragraph::of(first_line)];
    if placed.at_min_width && !event.config_item.is_empty() {
        paragraphs.push(Paragraph::of(vec![
            TextRun::plain(&event.config_item, 8).colored("FFFFFF"),
        ]));
    }
    paragraphs.push(Paragraph::of(vec![TextRun::plain(
        format!(
            "{} → {}",
            event.start.format("%d/%m %H:%M"),
            event.end.format("%d/%m %H:%M")
        ),
        8,
    )
    .colored("FFFFFF")]));

    builder.rounded_rect(rect, &settings.color_for(event.category), &paragraphs)
}
