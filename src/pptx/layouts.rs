//! Slide layout inspection and selection.
//!
//! Layouts are exposed in the numeric order of their part names
//! (`slideLayout1.xml`, `slideLayout2.xml`, …), which is also the index
//! space of the `--*-layout-index` flags.

use crate::errors::{AppError, AppResult};
use crate::pptx::PptxPackage;
use crate::pptx::xml;
use crate::ui::messages::warning;

#[derive(Debug, Clone)]
pub struct LayoutInfo {
    pub index: usize,
    pub name: String,
    pub placeholders: usize,
    /// Package part name, e.g. "ppt/slideLayouts/slideLayout3.xml".
    pub part: String,
}

/// All layouts in the template, index order.
pub fn list_layouts(pkg: &PptxPackage) -> Vec<LayoutInfo> {
    let mut numbered: Vec<(u32, String)> = pkg
        .part_names()
        .filter_map(|name| Some((layout_number(name)?, name.to_string())))
        .collect();
    numbered.sort();

    numbered
        .into_iter()
        .enumerate()
        .map(|(index, (_, part))| {
            let bytes = pkg.part(&part).unwrap_or_default();
            let name = xml::find_attr(bytes, b"p:cSld", b"name").unwrap_or_default();
            let placeholders = count_occurrences(bytes, b"<p:ph");
            LayoutInfo {
                index,
                name,
                placeholders,
                part,
            }
        })
        .collect()
}

fn layout_number(part: &str) -> Option<u32> {
    let rest = part.strip_prefix("ppt/slideLayouts/slideLayout")?;
    rest.strip_suffix(".xml")?.parse().ok()
}

fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    if needle.is_empty() || haystack.len() < needle.len() {
        return 0;
    }
    haystack.windows(needle.len()).filter(|w| w == &needle).count()
}

/// Layout names that count as blank-ish when no index is requested.
const BLANK_NAMES: &[&str] = &["blank", "vide", "title only", "titre uniquement", "titre seul"];

/// Pick a layout. A requested index is clamped into range with a warning;
/// without one, prefer a blank-named layout, then the one with the fewest
/// placeholders.
pub fn choose_layout(pkg: &PptxPackage, requested: Option<usize>) -> AppResult<LayoutInfo> {
    let layouts = list_layouts(pkg);
    if layouts.is_empty() {
        return Err(AppError::Template("template has no slide layouts".into()));
    }
    let last = layouts.len() - 1;

    if let Some(idx) = requested {
        let clamped = idx.min(last);
        if clamped != idx {
            warning(format!(
                "layout index {idx} out of range; using {clamped} instead (0..{last})"
            ));
        }
        return Ok(layouts[clamped].clone());
    }

    if let Some(blank) = layouts.iter().find(|l| {
        let name = l.name.trim().to_lowercase();
        BLANK_NAMES.iter().any(|k| name.contains(k))
    }) {
        return Ok(blank.clone());
    }

    Ok(layouts
        .iter()
        .min_by_key(|l| l.placeholders)
        .cloned()
        .unwrap())
}
