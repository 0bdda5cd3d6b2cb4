//! In-memory PPTX package.
//!
//! The whole template zip is read up front; slides and relationships are
//! edited as strings; saving writes a fresh zip next to the target path and
//! renames it into place, so a failed run never leaves a truncated deck.

use crate::errors::{AppError, AppResult};
use crate::pptx::xml;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const REL_TYPE_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_TYPE_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const REL_TYPE_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
const SLIDE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

const PRESENTATION: &str = "ppt/presentation.xml";
const PRESENTATION_RELS: &str = "ppt/_rels/presentation.xml.rels";
const CONTENT_TYPES: &str = "[Content_Types].xml";

const NEW_SLIDE_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#,
    r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#,
    r#" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
    r#"<p:cSld><p:spTree>"#,
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
    r#"</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
);

pub struct PptxPackage {
    parts: BTreeMap<String, Vec<u8>>,
    pub slide_width: i64,
    pub slide_height: i64,
}

impl PptxPackage {
    pub fn open(path: &Path) -> AppResult<Self> {
        let file = File::open(path)
            .map_err(|e| AppError::Template(format!("cannot open {}: {e}", path.display())))?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;

        let mut parts = BTreeMap::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let mut buf = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut buf)?;
            parts.insert(entry.name().to_string(), buf);
        }

        let presentation = parts
            .get(PRESENTATION)
            .ok_or_else(|| AppError::Template(format!("{} is not a PPTX: missing {PRESENTATION}", path.display())))?;

        let slide_width = xml::find_attr(presentation, b"p:sldSz", b"cx")
            .and_then(|v| v.parse().ok())
            .unwrap_or(12_192_000);
        let slide_height = xml::find_attr(presentation, b"p:sldSz", b"cy")
            .and_then(|v| v.parse().ok())
            .unwrap_or(6_858_000);

        Ok(Self {
            parts,
            slide_width,
            slide_height,
        })
    }

    /// Write the package to `path` through a temporary sibling file and an
    /// atomic rename.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        let tmp = temp_sibling(path);
        let file = File::create(&tmp)?;
        let mut writer = ZipWriter::new(BufWriter::new(file));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, data) in &self.parts {
            writer.start_file(name.as_str(), options)?;
            writer.write_all(data)?;
        }
        writer.finish()?;

        fs::rename(&tmp, path).inspect_err(|_| {
            let _ = fs::remove_file(&tmp);
        })?;
        Ok(())
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(name).map(Vec::as_slice)
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    fn part_str(&self, name: &str) -> AppResult<String> {
        self.parts
            .get(name)
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .ok_or_else(|| AppError::Template(format!("missing package part: {name}")))
    }

    pub fn insert_part(&mut self, name: &str, data: Vec<u8>) {
        self.parts.insert(name.to_string(), data);
    }

    /// Part name of the slide the presentation lists first.
    pub fn first_slide_part(&self) -> AppResult<String> {
        let presentation = self.part_str(PRESENTATION)?;
        let rid = xml::find_attr(presentation.as_bytes(), b"p:sldId", b"r:id")
            .ok_or_else(|| AppError::Template("template has no slides".into()))?;

        let rels = self.part_str(PRESENTATION_RELS)?;
        let target = xml::parse_rels(rels.as_bytes())?
            .into_iter()
            .find(|r| r.id == rid)
            .map(|r| r.target)
            .ok_or_else(|| AppError::Template(format!("unresolved slide relationship {rid}")))?;

        Ok(resolve_target("ppt", &target))
    }

    /// Append an empty slide bound to `layout_part` and wire it into the
    /// content types, the presentation part and its relationships. Returns
    /// the new slide's part name.
    pub fn add_slide(&mut self, layout_part: &str) -> AppResult<String> {
        let number = 1 + self
            .parts
            .keys()
            .filter_map(|name| slide_number(name))
            .max()
            .unwrap_or(0);
        let part_name = format!("ppt/slides/slide{number}.xml");

        // slide part + its relationship to the layout
        let layout_base = layout_part
            .rsplit('/')
            .next()
            .ok_or_else(|| AppError::Template(format!("bad layout part name {layout_part}")))?;
        let slide_rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL_TYPE_SLIDE_LAYOUT}" Target="../slideLayouts/{layout_base}"/></Relationships>"#
        );
        self.insert_part(&part_name, NEW_SLIDE_XML.as_bytes().to_vec());
        self.insert_part(
            &format!("ppt/slides/_rels/slide{number}.xml.rels"),
            slide_rels.into_bytes(),
        );

        // content types override
        let mut types = self.part_str(CONTENT_TYPES)?;
        let override_entry =
            format!(r#"<Override PartName="/{part_name}" ContentType="{SLIDE_CONTENT_TYPE}"/>"#);
        insert_before(&mut types, "</Types>", &override_entry)?;
        self.insert_part(CONTENT_TYPES, types.into_bytes());

        // presentation relationship
        let mut pres_rels = self.part_str(PRESENTATION_RELS)?;
        let rid = format!("rId{}", next_rel_number(&pres_rels));
        let rel_entry = format!(
            r#"<Relationship Id="{rid}" Type="{REL_TYPE_SLIDE}" Target="slides/slide{number}.xml"/>"#
        );
        insert_before(&mut pres_rels, "</Relationships>", &rel_entry)?;
        self.insert_part(PRESENTATION_RELS, pres_rels.into_bytes());

        // slide id list entry
        let mut presentation = self.part_str(PRESENTATION)?;
        if presentation.contains("<p:sldIdLst/>") {
            presentation = presentation.replace("<p:sldIdLst/>", "<p:sldIdLst></p:sldIdLst>");
        } else if !presentation.contains("</p:sldIdLst>") {
            insert_before(&mut presentation, "<p:sldSz", "<p:sldIdLst></p:sldIdLst>")?;
        }
        let sld_id = next_slide_id(&presentation);
        let sld_entry = format!(r#"<p:sldId id="{sld_id}" r:id="{rid}"/>"#);
        insert_before(&mut presentation, "</p:sldIdLst>", &sld_entry)?;
        self.insert_part(PRESENTATION, presentation.into_bytes());

        Ok(part_name)
    }

    /// Append a shape-tree fragment to an existing slide part.
    pub fn append_shapes(&mut self, slide_part: &str, fragment: &str) -> AppResult<()> {
        let mut slide = self.part_str(slide_part)?;
        insert_before(&mut slide, "</p:spTree>", fragment)?;
        self.insert_part(slide_part, slide.into_bytes());
        Ok(())
    }

    /// Register an external hyperlink on a slide; returns the relationship id
    /// to reference from `a:hlinkClick`.
    pub fn add_hyperlink_rel(&mut self, slide_part: &str, url: &str) -> AppResult<String> {
        let rels_name = rels_name_for(slide_part);
        let mut rels = match self.parts.get(&rels_name) {
            Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            None => {
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#.to_string()
            }
        };

        // reuse an existing relationship for the same URL
        if let Ok(existing) = xml::parse_rels(rels.as_bytes()) {
            if let Some(r) = existing
                .iter()
                .find(|r| r.rel_type == REL_TYPE_HYPERLINK && r.target == url)
            {
                return Ok(r.id.clone());
            }
        }

        let rid = format!("rId{}", next_rel_number(&rels));
        let entry = format!(
            r#"<Relationship Id="{rid}" Type="{REL_TYPE_HYPERLINK}" Target="{}" TargetMode="External"/>"#,
            xml::esc(url)
        );
        insert_before(&mut rels, "</Relationships>", &entry)?;
        self.insert_part(&rels_name, rels.into_bytes());
        Ok(rid)
    }

    /// Highest `p:cNvPr` shape id on a slide, so new shapes extend the
    /// numbering instead of colliding with template shapes.
    pub fn max_shape_id(&self, slide_part: &str) -> u32 {
        static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r#"<p:cNvPr[^>]*\bid="(\d+)""#).unwrap());
        let Some(bytes) = self.parts.get(slide_part) else {
            return 1;
        };
        let text = String::from_utf8_lossy(bytes);
        re.captures_iter(&text)
            .filter_map(|c| c[1].parse::<u32>().ok())
            .max()
            .unwrap_or(1)
    }
}

/// "ppt/slides/slide3.xml" -> "ppt/slides/_rels/slide3.xml.rels"
fn rels_name_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, base)) => format!("{dir}/_rels/{base}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

fn slide_number(part: &str) -> Option<u32> {
    let rest = part.strip_prefix("ppt/slides/slide")?;
    rest.strip_suffix(".xml")?.parse().ok()
}

/// Resolve a relationship target against its source directory ("ppt" for the
/// presentation part). Leading "/" means package-absolute.
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = base_dir.split('/').collect();
    for seg in target.split('/') {
        match seg {
            ".." => {
                segments.pop();
            }
            "." => {}
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn insert_before(text: &mut String, marker: &str, fragment: &str) -> AppResult<()> {
    let pos = text
        .rfind(marker)
        .ok_or_else(|| AppError::Template(format!("malformed part: no {marker} marker")))?;
    text.insert_str(pos, fragment);
    Ok(())
}

fn next_rel_number(rels: &str) -> u32 {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r#"\bId="rId(\d+)""#).unwrap());
    1 + re
        .captures_iter(rels)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .max()
        .unwrap_or(0)
}

fn next_slide_id(presentation: &str) -> u32 {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r#"<p:sldId\b[^>]*\bid="(\d+)""#).unwrap());
    let max = re
        .captures_iter(presentation)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .max()
        .unwrap_or(255);
    max.max(255) + 1
}

fn temp_sibling(path: &Path) -> std::path::PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out.pptx".to_string());
    name.push_str(".tmp");
    path.with_file_name(name)
}
