//! Command-line interface definition for cabdeck.

use crate::errors::{AppError, AppResult};
use clap::Parser;
use std::path::PathBuf;

/// Generate a CAB support deck: S+1 timeline, one detail slide per change,
/// optional S-1 statistics and current-week timeline.
#[derive(Parser)]
#[command(
    name = "cabdeck",
    version = env!("CARGO_PKG_VERSION"),
    about = "Generate a CAB weekly-change PowerPoint deck (S+1 timeline + details) from a change export",
    long_about = None
)]
pub struct Cli {
    /// Path to the CSV/XLSX file with changes
    #[arg(long = "data", value_name = "FILE")]
    pub data: PathBuf,

    /// Path to the PPTX template (S+1 timeline drawn on its first slide by default)
    #[arg(long = "template", value_name = "FILE")]
    pub template: PathBuf,

    /// Output PPTX path
    #[arg(long = "out", value_name = "FILE")]
    pub out: PathBuf,

    /// Reference date (YYYY-MM-DD); default: today
    #[arg(long = "ref-date")]
    pub ref_date: Option<String>,

    /// Slide layout index for the detail slides
    #[arg(long = "detail-layout-index")]
    pub detail_layout_index: Option<usize>,

    /// Slide layout index for the S+1 timeline (otherwise the template's first slide is used)
    #[arg(long = "splus1-layout-index")]
    pub splus1_layout_index: Option<usize>,

    /// Add S-1 statistics slides (closure-code pie + non-success list)
    #[arg(long = "sminus1-pie")]
    pub sminus1_pie: bool,

    /// Slide layout index for the S-1 slides
    #[arg(long = "sminus1-layout-index")]
    pub sminus1_layout_index: Option<usize>,

    /// Add a timeline slide for the current week (S)
    #[arg(long = "current-week")]
    pub current_week: bool,

    /// Slide layout index for the current-week slide
    #[arg(long = "current-week-layout-index")]
    pub current_week_layout_index: Option<usize>,

    /// List slide layouts available in the template and exit
    #[arg(long = "list-layouts")]
    pub list_layouts: bool,

    /// Force the CSV encoding (e.g. cp1252, latin1, utf-8)
    #[arg(long = "encoding")]
    pub encoding: Option<String>,

    /// Force the CSV separator (e.g. ';' ',' '\t'). If omitted, common ones are tried.
    #[arg(long = "sep")]
    pub sep: Option<String>,

    /// Comma-separated tags to include (matched against the tags column)
    #[arg(long = "include-tags", value_name = "TAGS")]
    pub include_tags: Option<String>,

    /// JSON configuration file; explicitly-given flags override its values
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// The forced separator as a single ASCII character. "\t" and "tab" are
    /// accepted spellings for a tabulation.
    pub fn separator(&self) -> AppResult<Option<char>> {
        let Some(raw) = &self.sep else {
            return Ok(None);
        };
        let c = match raw.as_str() {
            "\\t" | "tab" | "TAB" => '\t',
            s => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii() => c,
                    _ => return Err(AppError::InvalidSeparator(raw.clone())),
                }
            }
        };
        Ok(Some(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Cli {
        let mut args = vec![
            "cabdeck",
            "--data", "changes.csv",
            "--template", "tpl.pptx",
            "--out", "deck.pptx",
        ];
        args.extend_from_slice(extra);
        Cli::parse_from(args)
    }

    #[test]
    fn separator_spellings() {
        assert_eq!(parse(&["--sep", ";"]).separator().unwrap(), Some(';'));
        assert_eq!(parse(&["--sep", "\\t"]).separator().unwrap(), Some('\t'));
        assert_eq!(parse(&["--sep", "tab"]).separator().unwrap(), Some('\t'));
        assert_eq!(parse(&[]).separator().unwrap(), None);
        assert!(parse(&["--sep", "abc"]).separator().is_err());
        assert!(parse(&["--sep", "→"]).separator().is_err());
    }

    #[test]
    fn required_paths_are_parsed() {
        let cli = parse(&[]);
        assert_eq!(cli.data, PathBuf::from("changes.csv"));
        assert!(!cli.list_layouts);
    }
}
