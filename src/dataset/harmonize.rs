//! Column-name harmonization.
//!
//! Export headers vary by tool version and locale: accents dropped or kept,
//! smart quotes, stray whitespace, English variants. Headers are folded and
//! renamed to canonical keys here, once, so the core never sees raw names.

use crate::core::classify::fold;
use crate::dataset::Table;
use crate::errors::{AppError, AppResult};

/// Canonical column keys used everywhere downstream.
pub mod columns {
    pub const ID: &str = "id";
    pub const TYPE: &str = "type";
    pub const STATUS: &str = "status";
    pub const PLANNED_START: &str = "planned_start";
    pub const PLANNED_END: &str = "planned_end";
    pub const SUMMARY: &str = "summary";
    pub const CONFIG_ITEM: &str = "config_item";
    pub const CLOSURE_CODE: &str = "closure_code";
    pub const CLOSURE_DETAIL: &str = "closure_detail";
    pub const TAGS: &str = "tags";
    pub const DESCRIPTION: &str = "description";
    pub const JUSTIFICATION: &str = "justification";
    pub const IMPL_PLAN: &str = "impl_plan";
    pub const RISK_ANALYSIS: &str = "risk_analysis";
    pub const ROLLBACK_PLAN: &str = "rollback_plan";
    pub const TEST_PLAN: &str = "test_plan";
    pub const EXTRA_INFO: &str = "extra_info";
    pub const REQUESTER: &str = "requester";
    pub const ASSIGNEE: &str = "assignee";
}

/// Columns the generator cannot work without.
pub const REQUIRED: &[&str] = &[
    columns::ID,
    columns::TYPE,
    columns::STATUS,
    columns::PLANNED_START,
    columns::PLANNED_END,
];

/// Human-facing names for the required keys, used in the SchemaError text.
pub fn display_name(key: &str) -> &str {
    match key {
        columns::ID => "Numéro",
        columns::TYPE => "Type",
        columns::STATUS => "Etat",
        columns::PLANNED_START => "Date de début planifiée",
        columns::PLANNED_END => "Date de fin planifiée",
        other => other,
    }
}

/// Fold a header for matching: accents stripped, straight and smart quotes
/// dropped, whitespace collapsed.
fn fold_header(header: &str) -> String {
    let folded = fold(header);
    let cleaned: String = folded
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | '’' | '‘' | '“' | '”' | '`'))
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn canonical_key(header: &str) -> Option<&'static str> {
    let f = fold_header(header);
    let key = match f.as_str() {
        "numero" | "number" | "reference" => columns::ID,
        "type" | "type de changement" | "change type" => columns::TYPE,
        "etat" | "statut" | "status" | "state" => columns::STATUS,
        "date de debut planifiee" | "debut planifie" | "planned start date" | "planned start" => {
            columns::PLANNED_START
        }
        "date de fin planifiee" | "fin planifiee" | "planned end date" | "planned end" => {
            columns::PLANNED_END
        }
        "resume" | "summary" => columns::SUMMARY,
        "element de configuration" | "configuration item" | "ci" => columns::CONFIG_ITEM,
        "code de fermeture" | "code de cloture" | "closure code" | "close code" => {
            columns::CLOSURE_CODE
        }
        "detail de cloture" | "detail de fermeture" | "closure detail" | "close notes" => {
            columns::CLOSURE_DETAIL
        }
        "balises" | "tags" => columns::TAGS,
        "description" => columns::DESCRIPTION,
        "justification" => columns::JUSTIFICATION,
        "plan dimplementation" | "plan d implementation" | "implementation plan" => {
            columns::IMPL_PLAN
        }
        "analyse de risques et de limpact" | "analyse de risques et de l impact"
        | "analyse risques & impacts" | "risk and impact analysis" => columns::RISK_ANALYSIS,
        "plan de retour en arriere" | "plan de retour arriere" | "rollback plan" => {
            columns::ROLLBACK_PLAN
        }
        "plan de tests" | "test plan" => columns::TEST_PLAN,
        "informations complementaires" | "additional information" => columns::EXTRA_INFO,
        "demandeur" | "requester" | "requested by" => columns::REQUESTER,
        "affecte" | "affecte a" | "assigne a" | "assignee" | "assigned to" | "responsable"
        | "owner" => columns::ASSIGNEE,
        _ => return None,
    };
    Some(key)
}

/// Rename every recognized header in place. Unrecognized headers keep their
/// original name; a later duplicate of an already-assigned key is left alone.
pub fn harmonize(table: &mut Table) {
    let mut seen: Vec<&'static str> = Vec::new();
    for header in &mut table.columns {
        if let Some(key) = canonical_key(header) {
            if !seen.contains(&key) {
                *header = key.to_string();
                seen.push(key);
            }
        }
    }
}

/// Fatal check: every required canonical column must be present after
/// harmonization, reported all at once.
pub fn check_required(table: &Table) -> AppResult<()> {
    let missing: Vec<String> = REQUIRED
        .iter()
        .filter(|key| !table.has_column(key))
        .map(|key| display_name(key).to_string())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::Schema {
        missing,
        present: table.columns.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(headers: &[&str]) -> Table {
        Table {
            columns: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    #[test]
    fn french_headers_with_accents() {
        let mut t = table_with(&[
            "Numéro",
            "Type",
            "Etat",
            "Date de début planifiée",
            "Date de fin planifiée",
        ]);
        harmonize(&mut t);
        assert!(check_required(&t).is_ok());
        assert_eq!(t.columns[0], columns::ID);
        assert_eq!(t.columns[3], columns::PLANNED_START);
    }

    #[test]
    fn accentless_and_quoted_variants_match() {
        let mut t = table_with(&[
            "NUMERO",
            "  Type ",
            "État",
            "Date de debut planifiee",
            "Date de fin planifiée",
            "Élément de configuration",
            "Plan d’implémentation",
        ]);
        harmonize(&mut t);
        assert!(t.has_column(columns::CONFIG_ITEM));
        assert!(t.has_column(columns::IMPL_PLAN));
        assert!(check_required(&t).is_ok());
    }

    #[test]
    fn missing_columns_reported_together() {
        let mut t = table_with(&["Numéro", "Commentaire"]);
        harmonize(&mut t);
        let err = check_required(&t).unwrap_err();
        match err {
            crate::errors::AppError::Schema { missing, present } => {
                assert_eq!(missing.len(), 4);
                assert!(missing.contains(&"Type".to_string()));
                assert!(missing.contains(&"Date de fin planifiée".to_string()));
                assert!(present.contains(&"Commentaire".to_string()));
            }
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_headers_only_bind_once() {
        let mut t = table_with(&["Numéro", "Number"]);
        harmonize(&mut t);
        assert_eq!(t.columns[0], columns::ID);
        assert_eq!(t.columns[1], "Number");
    }

    #[test]
    fn unknown_headers_untouched() {
        let mut t = table_with(&["Colonne maison"]);
        harmonize(&mut t);
        assert_eq!(t.columns[0], "Colonne maison");
    }
}
