//! Minimal XLSX reading: first worksheet only, every cell as a string.
//!
//! Change exports are flat tables, so this deliberately skips styles, merged
//! cells and formulas. Shared strings, inline strings and Excel's `_xHHHH_`
//! escapes are handled; numeric cells surface as bare numbers and the date
//! parser picks serial values up downstream.

use crate::dataset::{LoadMeta, Table};
use crate::errors::{AppError, AppResult};
use crate::pptx::xml::parse_rels;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use zip::ZipArchive;

type Archive = ZipArchive<BufReader<File>>;

pub fn read_first_sheet(path: &Path) -> AppResult<(Table, LoadMeta)> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    if read_part(&mut archive, "[Content_Types].xml").is_err() {
        return Err(AppError::Load(format!(
            "{} is not an XLSX package (missing [Content_Types].xml)",
            path.display()
        )));
    }

    let shared = read_shared_strings(&mut archive)?;
    let sheet_part = first_sheet_part(&mut archive)?;
    let sheet_xml = read_part(&mut archive, &sheet_part)?;
    let mut grid = read_sheet(&sheet_xml, &shared)?;

    if grid.is_empty() {
        return Err(AppError::Load(format!(
            "worksheet {sheet_part} contains no rows"
        )));
    }

    let columns: Vec<String> = grid.remove(0).iter().map(|c| c.trim().to_string()).collect();
    let width = columns.len();
    for row in &mut grid {
        row.resize(width, String::new());
    }

    Ok((
        Table { columns, rows: grid },
        LoadMeta {
            reader: "xlsx",
            encoding: None,
            separator: None,
        },
    ))
}

fn read_part(archive: &mut Archive, name: &str) -> AppResult<Vec<u8>> {
    let mut entry = archive
        .by_name(name)
        .map_err(|_| AppError::Load(format!("missing package part: {name}")))?;
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Shared strings table, one concatenated string per `<si>` (rich-text runs
/// collapse to their plain text).
fn read_shared_strings(archive: &mut Archive) -> AppResult<Vec<String>> {
    let bytes = match read_part(archive, "xl/sharedStrings.xml") {
        Ok(b) => b,
        Err(_) => return Ok(Vec::new()), // absent table is valid
    };

    let mut reader = Reader::from_reader(bytes.as_slice());
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"t" if in_si => in_t = true,
                _ => {}
            },
            Ok(Event::Text(t)) if in_t => {
                current.push_str(&t.unescape().unwrap_or_default());
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"si" => {
                    strings.push(decode_excel_escapes(&current));
                    in_si = false;
                }
                b"t" => in_t = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

/// Part name of the workbook's first sheet, resolved through the workbook
/// relationships.
fn first_sheet_part(archive: &mut Archive) -> AppResult<String> {
    let workbook = read_part(archive, "xl/workbook.xml")?;
    let rels = read_part(archive, "xl/_rels/workbook.xml.rels")?;

    let mut reader = Reader::from_reader(workbook.as_slice());
    let mut buf = Vec::new();
    let mut rel_id: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"sheet" => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"r:id" {
                        rel_id = Some(String::from_utf8_lossy(attr.value.as_ref()).into_owned());
                    }
                }
                if rel_id.is_some() {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    let rel_id = rel_id.ok_or_else(|| AppError::Load("workbook declares no sheets".into()))?;
    let target = parse_rels(&rels)?
        .into_iter()
        .find(|r| r.id == rel_id)
        .map(|r| r.target)
        .ok_or_else(|| AppError::Load(format!("unresolved sheet relationship {rel_id}")))?;

    Ok(match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    })
}

fn read_sheet(xml: &[u8], shared: &[String]) -> AppResult<Vec<Vec<String>>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell_type = String::new();
    let mut cell_col: usize = 0;
    let mut in_value = false;
    let mut in_inline = false;
    let mut value = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"row" => row.clear(),
                b"c" => {
                    cell_type.clear();
                    value.clear();
                    cell_col = row.len();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"t" => {
                                cell_type =
                                    String::from_utf8_lossy(attr.value.as_ref()).into_owned();
                            }
                            b"r" => {
                                let cell_ref = String::from_utf8_lossy(attr.value.as_ref());
                                if let Some(col) = column_of_ref(&cell_ref) {
                                    cell_col = col;
                                }
                            }
                            _ => {}
                        }
                    }
                }
                b"v" => in_value = true,
                b"is" => in_inline = true,
                b"t" if in_inline => in_value = true,
                _ => {}
            },
            Ok(Event::Text(t)) if in_value => {
                value.push_str(&t.unescape().unwrap_or_default());
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"row" => rows.push(std::mem::take(&mut row)),
                b"c" => {
                    let resolved = resolve_cell(&cell_type, &value, shared);
                    if cell_col >= row.len() {
                        row.resize(cell_col, String::new());
                        row.push(resolved);
                    } else {
                        row[cell_col] = resolved;
                    }
                }
                b"v" | b"t" => in_value = false,
                b"is" => in_inline = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(rows)
}

fn resolve_cell(cell_type: &str, value: &str, shared: &[String]) -> String {
    match cell_type {
        "s" => value
            .parse::<usize>()
            .ok()
            .and_then(|i| shared.get(i).cloned())
            .unwrap_or_default(),
        "inlineStr" | "str" => decode_excel_escapes(value),
        _ => value.to_string(),
    }
}

/// "C7" -> 2. Letters only; the digits are the row and are ignored.
fn column_of_ref(cell_ref: &str) -> Option<usize> {
    let letters: String = cell_ref.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    if letters.is_empty() {
        return None;
    }
    let mut col = 0usize;
    for c in letters.chars() {
        col = col * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    Some(col - 1)
}

/// Excel encodes control characters in XML as `_xHHHH_`.
fn decode_excel_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'_'
            && i + 6 < bytes.len()
            && bytes[i + 1] == b'x'
            && bytes[i + 6] == b'_'
            && bytes[i + 2..i + 6].iter().all(|b| b.is_ascii_hexdigit())
        {
            let hex = std::str::from_utf8(&bytes[i + 2..i + 6]).unwrap_or("");
            if let Some(c) = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
                out.push(c);
                i += 7;
                continue;
            }
        }
        // byte-accurate re-assembly for multi-byte chars
        let ch_len = utf8_len(bytes[i]);
        if let Ok(chunk) = std::str::from_utf8(&bytes[i..(i + ch_len).min(bytes.len())]) {
            out.push_str(chunk);
        }
        i += ch_len;
    }
    out
}

fn utf8_len(first: u8) -> usize {
    match first {
        b if b & 0b1000_0000 == 0 => 1,
        b if b & 0b1110_0000 == 0b1100_0000 => 2,
        b if b & 0b1111_0000 == 0b1110_0000 => 3,
        _ => 4,
    }
}
