//! Dataset loading: CSV with encoding/separator fallback, minimal XLSX
//! reading, and column-name harmonization. Everything downstream of this
//! module sees canonical column keys and string-typed cells only.

pub mod csv;
pub mod harmonize;
pub mod xlsx;

use crate::errors::AppResult;
use std::path::Path;

/// A rectangular table of string cells with a header row.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell by row index and column name; absent columns and ragged rows
    /// read as empty.
    pub fn get(&self, row: usize, column: &str) -> &str {
        self.column_index(column)
            .and_then(|c| self.rows.get(row).and_then(|r| r.get(c)))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// How the loader ended up decoding the input, echoed in the console summary.
#[derive(Debug, Clone)]
pub struct LoadMeta {
    pub reader: &'static str,
    pub encoding: Option<String>,
    pub separator: Option<char>,
}

/// Load a change export. XLSX goes through the zip/XML reader; anything else
/// is treated as delimited text with encoding and separator fallback.
pub fn load(path: &Path, encoding: Option<&str>, separator: Option<char>) -> AppResult<(Table, LoadMeta)> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if ext == "xlsx" || ext == "xlsm" {
        xlsx::read_first_sheet(path)
    } else {
        csv::load_with_fallback(path, encoding, separator)
    }
}

/// Keep only rows whose tags column contains any of `tags`, matched as a
/// case-insensitive substring. No tags or no tags column keeps everything
/// (the latter with a warning, since the filter was explicitly requested).
pub fn filter_by_tags(table: Table, tags: &[String]) -> Table {
    let wanted: Vec<&str> = tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).collect();
    if wanted.is_empty() {
        return table;
    }
    if !table.has_column(harmonize::columns::TAGS) {
        crate::ui::messages::warning("tags column not found; --include-tags ignored");
        return table;
    }

    let pattern = wanted
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    // escaped alternation of literals; cannot fail to compile
    let re = regex::RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .unwrap();

    let col = table.column_index(harmonize::columns::TAGS).unwrap();
    let rows = table
        .rows
        .into_iter()
        .filter(|row| row.get(col).is_some_and(|cell| re.is_match(cell)))
        .collect();

    Table {
        columns: table.columns,
        rows,
    }
}
