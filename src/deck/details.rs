//! One detail slide per change of the coming week: title with a hyperlinked
//! identifier, a badge strip with the key attributes, and a two-column table
//! of the long-form fields.

use crate::config::Settings;
use crate::core::events::ChangeEvent;
use crate::dataset::harmonize::{columns, display_name};
use crate::dataset::Table;
use crate::errors::AppResult;
use crate::pptx::slide::{cm, Paragraph, Rect, SlideBuilder, TextRun};
use crate::pptx::PptxPackage;
use crate::utils::formatting::format_slide_datetime;

/// Long-form fields shown in the table, in slide order.
const DETAIL_FIELDS: [&str; 7] = [
    columns::DESCRIPTION,
    columns::JUSTIFICATION,
    columns::IMPL_PLAN,
    columns::RISK_ANALYSIS,
    columns::ROLLBACK_PLAN,
    columns::TEST_PLAN,
    columns::EXTRA_INFO,
];

const BADGE_COLUMNS: i64 = 3;
const BADGE_TOP: f64 = 2.4;
const BADGE_HEIGHT: f64 = 1.6;
const TABLE_TOP: f64 = 4.6;
const LABEL_COL_WIDTH: f64 = 6.0;

pub fn render(
    pkg: &mut PptxPackage,
    layout_part: &str,
    event: &ChangeEvent,
    table: &Table,
    settings: &Settings,
) -> AppResult<()> {
    let slide_part = pkg.add_slide(layout_part)?;
    let slide_width = pkg.slide_width;
    let mut builder = SlideBuilder::new(pkg, slide_part);

    let rid = builder.hyperlink(&settings.hyperlink_for(&event.id))?;
    let mut title_runs = vec![TextRun::plain(&event.id, 28).bold().linked(rid)];
    if !event.summary.is_empty() {
        title_runs.push(TextRun::plain(format!(" — {}", event.summary), 24));
    }
    builder.textbox(
        Rect {
            x: cm(1.0),
            y: cm(0.8),
            cx: slide_width - cm(2.0),
            cy: cm(1.4),
        },
        &[Paragraph::of(title_runs)],
    );

    draw_badges(&mut builder, slide_width, event, table);
    draw_field_table(&mut builder, slide_width, event, table);

    builder.commit()
}

fn draw_badges(builder: &mut SlideBuilder, slide_width: i64, event: &ChangeEvent, table: &Table) {
    let badges: [(&str, String); 6] = [
        ("Type", table.get(event.row_index, columns::TYPE).trim().to_string()),
        ("État", table.get(event.row_index, columns::STATUS).trim().to_string()),
        ("Demandeur", table.get(event.row_index, columns::REQUESTER).trim().to_string()),
        ("Affecté", table.get(event.row_index, columns::ASSIGNEE).trim().to_string()),
        ("Début planifié", format_slide_datetime(&event.start)),
        ("Fin planifiée", format_slide_datetime(&event.end)),
    ];

    let badge_width = (slide_width - cm(2.0)) / BADGE_COLUMNS;
    let mut slot: i64 = 0;
    for (label, value) in badges {
        if value.is_empty() {
            continue;
        }
        let rect = Rect {
            x: cm(1.0) + (slot % BADGE_COLUMNS) * badge_width,
            y: cm(BADGE_TOP) + (slot / BADGE_COLUMNS) * cm(BADGE_HEIGHT),
            cx: badge_width - cm(0.2),
            cy: cm(BADGE_HEIGHT),
        };
        builder.textbox(
            rect,
            &[
                Paragraph::of(vec![TextRun::plain(label, 10).bold()]),
                Paragraph::of(vec![TextRun::plain(value, 12)]),
            ],
        );
        slot += 1;
    }
}

fn draw_field_table(builder: &mut SlideBuilder, slide_width: i64, event: &ChangeEvent, table: &Table) {
    let mut rows: Vec<Vec<Vec<Paragraph>>> = Vec::new();
    for key in DETAIL_FIELDS {
        let value = table.get(event.row_index, key).trim();
        if value.is_empty() {
            continue;
        }
        rows.push(vec![
            vec![Paragraph::of(vec![TextRun::plain(display_name(key), 10).bold()])],
            vec![Paragraph::of(vec![TextRun::plain(value, 10)])],
        ]);
    }
    if rows.is_empty() {
        return;
    }

    let label_width = cm(LABEL_COL_WIDTH);
    let value_width = slide_width - cm(2.0) - label_width;
    builder.table(
        cm(1.0),
        cm(TABLE_TOP),
        &[label_width, value_width],
        cm(1.0),
        &rows,
    );
}
