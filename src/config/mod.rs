//! Configuration: an optional JSON file whose keys mirror the CLI flags,
//! merged so that explicitly-given flags always win. The resolved `Settings`
//! value is passed down to rendering; there is no global mutable state.

use crate::cli::parser::Cli;
use crate::core::classify::ChangeType;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::warning;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_URL_TEMPLATE: &str = "https://outils.change.fr/change={rfc}";

/// Raw shape of the JSON configuration file. Every field is optional;
/// unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub rfc_url_template: Option<String>,
    pub colors: BTreeMap<String, String>,
    pub detail_layout_index: Option<usize>,
    pub splus1_layout_index: Option<usize>,
    pub sminus1_layout_index: Option<usize>,
    pub current_week_layout_index: Option<usize>,
    pub sminus1_pie: Option<bool>,
    pub current_week: Option<bool>,
    pub include_tags: Option<TagList>,
}

/// Tags may be given as a JSON array or as one comma-joined string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagList {
    List(Vec<String>),
    Joined(String),
}

impl TagList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            TagList::List(v) => v,
            TagList::Joined(s) => s.split(',').map(|t| t.trim().to_string()).collect(),
        }
    }
}

impl FileConfig {
    pub fn load(path: &Path) -> AppResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&text)
            .map_err(|e| AppError::Config(format!("invalid JSON in {}: {e}", path.display())))
    }
}

/// Fully-resolved run settings after the CLI/file merge and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub rfc_url_template: String,
    /// Validated color overrides keyed by change-type key.
    pub colors: BTreeMap<String, String>,
    pub detail_layout_index: Option<usize>,
    pub splus1_layout_index: Option<usize>,
    pub sminus1_layout_index: Option<usize>,
    pub current_week_layout_index: Option<usize>,
    pub sminus1_pie: bool,
    pub current_week: bool,
    pub include_tags: Vec<String>,
}

impl Settings {
    pub fn resolve(cli: &Cli, file: FileConfig) -> Self {
        let rfc_url_template = match file.rfc_url_template {
            Some(t) if t.contains("{rfc}") => t,
            Some(t) => {
                warning(format!(
                    "rfc_url_template {t:?} has no {{rfc}} placeholder; using default"
                ));
                DEFAULT_URL_TEMPLATE.to_string()
            }
            None => DEFAULT_URL_TEMPLATE.to_string(),
        };

        let mut colors = BTreeMap::new();
        for (key, value) in file.colors {
            if is_hex_color(&value) {
                colors.insert(crate::core::classify::fold(&key), value.to_uppercase());
            } else {
                warning(format!(
                    "ignoring color override for {key:?}: {value:?} is not a 6-hex-digit value"
                ));
            }
        }

        let include_tags = match &cli.include_tags {
            Some(joined) => joined
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            None => file
                .include_tags
                .map(TagList::into_vec)
                .unwrap_or_default(),
        };

        Settings {
            rfc_url_template,
            colors,
            detail_layout_index: cli.detail_layout_index.or(file.detail_layout_index),
            splus1_layout_index: cli.splus1_layout_index.or(file.splus1_layout_index),
            sminus1_layout_index: cli.sminus1_layout_index.or(file.sminus1_layout_index),
            current_week_layout_index: cli
                .current_week_layout_index
                .or(file.current_week_layout_index),
            sminus1_pie: cli.sminus1_pie || file.sminus1_pie.unwrap_or(false),
            current_week: cli.current_week || file.current_week.unwrap_or(false),
            include_tags,
        }
    }

    /// Box fill for a change type, override first, default otherwise.
    pub fn color_for(&self, category: ChangeType) -> String {
        self.colors
            .get(category.key())
            .cloned()
            .unwrap_or_else(|| category.default_color().to_string())
    }

    /// Hyperlink for a change identifier; the identifier is lowercased the
    /// way the ticketing tool expects it.
    pub fn hyperlink_for(&self, id: &str) -> String {
        self.rfc_url_template.replace("{rfc}", &id.trim().to_lowercase())
    }
}

fn is_hex_color(s: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9a-fA-F]{6}$").unwrap()).is_match(s)
}
