//! Closure statistics for the elapsed week: an outcome pie chart, a table of
//! the changes that did not close in success, and a per-assignee load chart.

use crate::config::Settings;
use crate::core::classify::{classify_closure, ClosureOutcome};
use crate::core::events::ChangeEvent;
use crate::dataset::harmonize::columns;
use crate::dataset::Table;
use crate::core::week::WeekWindow;
use crate::errors::AppResult;
use crate::pptx::slide::{cm, Paragraph, Rect, SlideBuilder, TextRun};
use crate::pptx::PptxPackage;
use std::collections::BTreeMap;

const PIE_DIAMETER: f64 = 10.0;
const PIE_LEFT: f64 = 1.5;
const PIE_TOP: f64 = 2.6;
// 12 o'clock in preset-geometry angles (degrees clockwise from 3 o'clock)
const PIE_START_DEG: f64 = 270.0;

/// Render the three statistics slides for the events that ended during
/// `window`.
pub fn render(
    pkg: &mut PptxPackage,
    layout_part: &str,
    ended: &[ChangeEvent],
    table: &Table,
    window: &WeekWindow,
    settings: &Settings,
) -> AppResult<()> {
    render_pie(pkg, layout_part, ended, table, window)?;
    render_non_success(pkg, layout_part, ended, table, window, settings)?;
    render_assignees(pkg, layout_part, ended, table, window)
}

fn outcome_of(event: &ChangeEvent, table: &Table) -> ClosureOutcome {
    classify_closure(table.get(event.row_index, columns::CLOSURE_CODE))
}

fn render_pie(
    pkg: &mut PptxPackage,
    layout_part: &str,
    ended: &[ChangeEvent],
    table: &Table,
    window: &WeekWindow,
) -> AppResult<()> {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for event in ended {
        let outcome = outcome_of(event, table);
        if let Some(pos) = ClosureOutcome::CHARTED.iter().position(|o| *o == outcome) {
            *counts.entry(pos).or_default() += 1;
        }
    }
    let total: usize = counts.values().sum();

    let slide_part = pkg.add_slide(layout_part)?;
    let slide_width = pkg.slide_width;
    let mut builder = SlideBuilder::new(pkg, slide_part);
    builder.title(
        slide_width,
        &format!("Bilan des changements S-1 ({})", window.label()),
    );

    if total == 0 {
        builder.textbox(
            Rect {
                x: cm(1.0),
                y: cm(PIE_TOP),
                cx: slide_width - cm(2.0),
                cy: cm(1.2),
            },
            &[Paragraph::of(vec![TextRun::plain(
                "Aucun changement terminé sur la semaine écoulée.",
                14,
            )])],
        );
        return builder.commit();
    }

    let pie_rect = Rect {
        x: cm(PIE_LEFT),
        y: cm(PIE_TOP),
        cx: cm(PIE_DIAMETER),
        cy: cm(PIE_DIAMETER),
    };
    let mut angle = PIE_START_DEG;
    for (pos, count) in &counts {
        let outcome = ClosureOutcome::CHARTED[*pos];
        let sweep = 360.0 * *count as f64 / total as f64;
        // adj1 == adj2 draws nothing, so a lone full-circle slice is nudged
        let end = if sweep >= 359.99 { angle + 359.99 } else { angle + sweep };
        builder.pie_wedge(pie_rect, angle, end, outcome.color());
        angle += sweep;
    }

    // legend to the right of the pie, one swatch per non-empty bucket
    let legend_x = cm(PIE_LEFT + PIE_DIAMETER + 1.0);
    let mut row: i64 = 0;
    for (pos, count) in &counts {
        let outcome = ClosureOutcome::CHARTED[*pos];
        let y = cm(PIE_TOP) + row * cm(0.8);
        builder.solid_rect(
            Rect {
                x: legend_x,
                y,
                cx: cm(0.5),
                cy: cm(0.5),
            },
            outcome.color(),
        );
        let label = format!(
            "{} : {} ({})",
            outcome.label(),
            count,
            crate::utils::formatting::percent(*count, total)
        );
        builder.textbox(
            Rect {
                x: legend_x + cm(0.7),
                y,
                cx: slide_width - legend_x - cm(1.7),
                cy: cm(0.7),
            },
            &[Paragraph::of(vec![TextRun::plain(label, 11)])],
        );
        row += 1;
    }

    builder.commit()
}

fn render_non_success(
    pkg: &mut PptxPackage,
    layout_part: &str,
    ended: &[ChangeEvent],
    table: &Table,
    window: &WeekWindow,
    settings: &Settings,
) -> AppResult<()> {
    let mut flagged: Vec<&ChangeEvent> = ended
        .iter()
        .filter(|e| outcome_of(e, table) != ClosureOutcome::Success)
        .collect();
    flagged.sort_by(|a, b| a.id.cmp(&b.id));

    let slide_part = pkg.add_slide(layout_part)?;
    let slide_width = pkg.slide_width;
    let mut builder = SlideBuilder::new(pkg, slide_part);
    builder.title(
        slide_width,
        &format!("Changements non « Succès » S-1 ({})", window.label()),
    );

    if flagged.is_empty() {
        builder.textbox(
            Rect {
                x: cm(1.0),
                y: cm(2.6),
                cx: slide_width - cm(2.0),
                cy: cm(1.2),
            },
            &[Paragraph::of(vec![TextRun::plain(
                "Aucun changement non « Succès » pour S-1.",
                14,
            )])],
        );
        return builder.commit();
    }

    let mut rows: Vec<Vec<Vec<Paragraph>>> = vec![vec![
        header_cell("Numéro"),
        header_cell("Résumé"),
        header_cell("Code de fermeture"),
        header_cell("Détail de clôture"),
    ]];
    for event in flagged {
        let rid = builder.hyperlink(&settings.hyperlink_for(&event.id))?;
        rows.push(vec![
            vec![Paragraph::of(vec![
                TextRun::plain(&event.id, 10).bold().linked(rid),
            ])],
            text_cell(&event.summary),
            text_cell(table.get(event.row_index, columns::CLOSURE_CODE).trim()),
            text_cell(table.get(event.row_index, columns::CLOSURE_DETAIL).trim()),
        ]);
    }

    let usable = slide_width - cm(2.0);
    let id_w = cm(3.0);
    let code_w = cm(5.0);
    let detail_w = cm(8.0);
    let summary_w = usable - id_w - code_w - detail_w;
    builder.table(
        cm(1.0),
        cm(2.6),
        &[id_w, summary_w, code_w, detail_w],
        cm(0.9),
        &rows,
    );
    builder.commit()
}

fn render_assignees(
    pkg: &mut PptxPackage,
    layout_part: &str,
    ended: &[ChangeEvent],
    table: &Table,
    window: &WeekWindow,
) -> AppResult<()> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for event in ended {
        let who = table.get(event.row_index, columns::ASSIGNEE).trim();
        let key = if who.is_empty() { "non affecté" } else { who };
        *counts.entry(key.to_string()).or_default() += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(12);

    let slide_part = pkg.add_slide(layout_part)?;
    let slide_width = pkg.slide_width;
    let mut builder = SlideBuilder::new(pkg, slide_part);
    builder.title(
        slide_width,
        &format!("Changements par intervenant S-1 ({})", window.label()),
    );

    if ranked.is_empty() {
        builder.textbox(
            Rect {
                x: cm(1.0),
                y: cm(2.6),
                cx: slide_width - cm(2.0),
                cy: cm(1.2),
            },
            &[Paragraph::of(vec![TextRun::plain(
                "Aucun changement terminé sur la semaine écoulée.",
                14,
            )])],
        );
        return builder.commit();
    }

    let max_count = ranked.iter().map(|(_, c)| *c).max().unwrap_or(1);
    let label_width = cm(5.0);
    let bar_area = slide_width - cm(2.0) - label_width - cm(1.5);
    for (i, (who, count)) in ranked.iter().enumerate() {
        let y = cm(2.6) + i as i64 * cm(0.8);
        builder.textbox(
            Rect {
                x: cm(1.0),
                y,
                cx: label_width,
                cy: cm(0.7),
            },
            &[Paragraph::of(vec![TextRun::plain(who, 10)])],
        );
        let bar = (bar_area as f64 * *count as f64 / max_count as f64).round() as i64;
        builder.solid_rect(
            Rect {
                x: cm(1.0) + label_width,
                y,
                cx: bar.max(cm(0.2)),
                cy: cm(0.5),
            },
            "0066CC",
        );
        builder.textbox(
            Rect {
                x: cm(1.0) + label_width + bar + cm(0.1),
                y,
                cx: cm(1.2),
                cy: cm(0.7),
            },
            &[Paragraph::of(vec![TextRun::plain(count.to_string(), 10).bold()])],
        );
    }

    builder.commit()
}

fn header_cell(text: &str) -> Vec<Paragraph> {
    vec![Paragraph::of(vec![TextRun::plain(text, 10).bold()])]
}

fn text_cell(text: &str) -> Vec<Paragraph> {
    vec![Paragraph::of(vec![TextRun::plain(text, 10)])]
}
