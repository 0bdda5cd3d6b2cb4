//! Delimited-text loading with encoding and separator fallback.
//!
//! Exports come from a mix of tools: UTF-8 with or without BOM, cp1252 from
//! older Excel installs, semicolons from French locales. The loader tries a
//! fixed matrix of (encoding, separator) candidates and keeps the first
//! combination yielding a consistent multi-column table.

use crate::dataset::{LoadMeta, Table};
use crate::errors::{AppError, AppResult};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use std::fs;
use std::path::Path;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const SEPARATORS: &[char] = &[';', ',', '\t'];

pub fn load_with_fallback(
    path: &Path,
    forced_encoding: Option<&str>,
    forced_separator: Option<char>,
) -> AppResult<(Table, LoadMeta)> {
    let raw = fs::read(path)?;
    let (bytes, had_bom) = strip_bom(&raw);

    let encodings: Vec<&'static Encoding> = match forced_encoding {
        Some(label) => {
            let enc = Encoding::for_label(label.as_bytes())
                .ok_or_else(|| AppError::Load(format!("unknown encoding label: {label:?}")))?;
            vec![enc]
        }
        None => vec![UTF_8, WINDOWS_1252],
    };

    let separators: Vec<char> = match forced_separator {
        Some(c) => vec![c],
        None => SEPARATORS.to_vec(),
    };

    let mut fallback: Option<(Table, LoadMeta)> = None;

    for enc in &encodings {
        let (text, _, had_errors) = enc.decode(bytes);
        // Mojibake under this encoding; let a later candidate have it unless
        // the user forced this one.
        if had_errors && forced_encoding.is_none() {
            continue;
        }

        for &sep in &separators {
            let Some(table) = try_parse(&text, sep) else {
                continue;
            };
            let meta = LoadMeta {
                reader: if had_bom { "csv (utf-8-sig)" } else { "csv" },
                encoding: Some(enc.name().to_string()),
                separator: Some(sep),
            };
            if table.columns.len() > 1 || forced_separator.is_some() {
                return Ok((table, meta));
            }
            // Single-column parse: only acceptable when nothing better shows up.
            if fallback.is_none() {
                fallback = Some((table, meta));
            }
        }
    }

    fallback.ok_or_else(|| {
        AppError::Load(format!(
            "no encoding/separator combination could parse {}",
            path.display()
        ))
    })
}

fn strip_bom(raw: &[u8]) -> (&[u8], bool) {
    match raw.strip_prefix(UTF8_BOM) {
        Some(rest) => (rest, true),
        None => (raw, false),
    }
}

fn try_parse(text: &str, separator: char) -> Option<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(separator as u8)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .ok()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if columns.is_empty() {
        return None;
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.ok()?;
        let mut row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        row.resize(columns.len(), String::new());
        rows.push(row);
    }

    Some(Table { columns, rows })
}
