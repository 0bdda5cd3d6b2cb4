//! cabdeck: generate a CAB weekly-change PowerPoint deck from a change
//! export (CSV or XLSX) and a PPTX template.
//!
//! The pipeline: load and harmonize the export, build typed events, pick the
//! week windows around the reference date, pack each window's events onto a
//! 7-day grid, and append the slides to a copy of the template.

pub mod cli;
pub mod config;
pub mod core;
pub mod dataset;
pub mod deck;
pub mod errors;
pub mod pptx;
pub mod ui;
pub mod utils;

use crate::cli::parser::Cli;
use crate::config::{FileConfig, Settings};
use crate::core::events;
use crate::core::week::{current_week, next_week, previous_week};
use crate::errors::{AppError, AppResult};
use crate::pptx::{layouts, PptxPackage};
use crate::ui::messages::{info, success};
use chrono::NaiveDate;
use clap::Parser;

pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(&cli, file_config);

    let mut pkg = PptxPackage::open(&cli.template)?;

    if cli.list_layouts {
        print_layouts(&pkg);
        return Ok(());
    }

    let reference = resolve_ref_date(&cli)?;
    info(format!("date de référence : {reference}"));

    let (mut table, meta) = dataset::load(&cli.data, cli.encoding.as_deref(), cli.separator()?)?;
    dataset::harmonize::harmonize(&mut table);
    dataset::harmonize::check_required(&table)?;
    info(describe_load(&meta, table.len()));

    let total_rows = table.len();
    let table = dataset::filter_by_tags(table, &settings.include_tags);
    if !settings.include_tags.is_empty() {
        info(format!(
            "filtre tags {:?} : {} / {} lignes retenues",
            settings.include_tags,
            table.len(),
            total_rows
        ));
    }

    let all_events = events::build_events(&table)?;
    let report = deck::build_deck(&mut pkg, &table, &all_events, &settings, reference)?;

    pkg.save(&cli.out)?;
    success(format!("deck écrit dans {}", cli.out.display()));
    print_summary(&cli, &settings, &report, reference);

    Ok(())
}

fn resolve_ref_date(cli: &Cli) -> AppResult<NaiveDate> {
    match &cli.ref_date {
        Some(raw) => {
            utils::date::parse_ref_date(raw).ok_or_else(|| AppError::InvalidDate(raw.clone()))
        }
        None => Ok(utils::date::today()),
    }
}

fn print_layouts(pkg: &PptxPackage) {
    let mut table = utils::table::Table::new(vec!["Index", "Nom", "Placeholders"]);
    for layout in layouts::list_layouts(pkg) {
        table.add_row(vec![
            layout.index.to_string(),
            layout.name,
            layout.placeholders.to_string(),
        ]);
    }
    println!("{}", table.render());
}

fn describe_load(meta: &dataset::LoadMeta, rows: usize) -> String {
    let mut line = format!("{rows} lignes lues ({})", meta.reader);
    if let Some(enc) = &meta.encoding {
        line.push_str(&format!(", encodage {enc}"));
    }
    if let Some(sep) = meta.separator {
        let shown = if sep == '\t' { "\\t".to_string() } else { sep.to_string() };
        line.push_str(&format!(", séparateur '{shown}'"));
    }
    line
}

fn print_summary(
    cli: &Cli,
    settings: &Settings,
    report: &deck::DeckReport,
    reference: NaiveDate,
) {
    let next = next_week(reference);
    let mut table = utils::table::Table::new(vec!["Section", "Semaine", "Changements", "Slides"]);
    table.add_row(vec![
        "S+1".to_string(),
        next.label(),
        report.splus1_count.to_string(),
        format!("1 + {} détails", report.detail_slides),
    ]);
    if settings.current_week {
        table.add_row(vec![
            "S".to_string(),
            current_week(reference).label(),
            report.current_count.to_string(),
            "1".to_string(),
        ]);
    }
    if settings.sminus1_pie {
        table.add_row(vec![
            "S-1".to_string(),
            previous_week(reference).label(),
            report.sminus1_count.to_string(),
            "3".to_string(),
        ]);
    }
    println!("{}", table.render());
    info(format!(
        "timeline S+1 : {} rangée(s), données {}",
        report.splus1_rows,
        cli.data.display()
    ));
}
