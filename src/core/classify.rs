//! Accent-insensitive classification of free-text category fields.
//!
//! Exports mix French and English wording ("Échec avec retour arrière",
//! "fail with rollback", …); everything is folded before keyword matching and
//! every input maps to some bucket, so these functions never fail.

/// Lowercase, trim, and strip Latin accents. Shared with header harmonization.
pub fn fold(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.trim().to_lowercase().chars() {
        match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' => out.push('a'),
            'è' | 'é' | 'ê' | 'ë' => out.push('e'),
            'ì' | 'í' | 'î' | 'ï' => out.push('i'),
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' => out.push('o'),
            'ù' | 'ú' | 'û' | 'ü' => out.push('u'),
            'ý' | 'ÿ' => out.push('y'),
            'ç' => out.push('c'),
            'ñ' => out.push('n'),
            'œ' => out.push_str("oe"),
            'æ' => out.push_str("ae"),
            _ => out.push(c),
        }
    }
    out
}

/// Closure-code buckets for the S-1 statistics slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClosureOutcome {
    Success,
    SuccessWithDifficulty,
    Partial,
    FailureNoRollback,
    FailureRollback,
    /// Empty or unrecognized codes; ignored by the pie chart.
    Unknown,
}

impl ClosureOutcome {
    /// Buckets in the order the pie chart presents them.
    pub const CHARTED: [ClosureOutcome; 5] = [
        ClosureOutcome::Success,
        ClosureOutcome::SuccessWithDifficulty,
        ClosureOutcome::Partial,
        ClosureOutcome::FailureNoRollback,
        ClosureOutcome::FailureRollback,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ClosureOutcome::Success => "Succès",
            ClosureOutcome::SuccessWithDifficulty => "Succès avec difficulté",
            ClosureOutcome::Partial => "Implémenté partiellement",
            ClosureOutcome::FailureNoRollback => "Échec sans retour arrière",
            ClosureOutcome::FailureRollback => "Échec avec retour arrière",
            ClosureOutcome::Unknown => "Inconnu",
        }
    }

    /// Slice color on the pie chart (RRGGBB).
    pub fn color(&self) -> &'static str {
        match self {
            ClosureOutcome::Success => "00B050",
            ClosureOutcome::SuccessWithDifficulty => "FFC000",
            ClosureOutcome::Partial => "FFCC99",
            ClosureOutcome::FailureNoRollback => "FF8C00",
            ClosureOutcome::FailureRollback => "C00000",
            ClosureOutcome::Unknown => "808080",
        }
    }
}

/// Classify a closure code. More specific combinations are tested before
/// their parent bucket; an explicit "sans"/"without" negation beats the
/// rollback keyword; a failure with no rollback mention counts as
/// failure-without-rollback.
pub fn classify_closure(code: &str) -> ClosureOutcome {
    let t = fold(code);
    if t.is_empty() {
        return ClosureOutcome::Unknown;
    }

    if t.contains("succes") || t.contains("reussi") || t.contains("success") {
        if t.contains("diffic") {
            return ClosureOutcome::SuccessWithDifficulty;
        }
        return ClosureOutcome::Success;
    }

    if t.contains("partiel") || t.contains("partial") {
        return ClosureOutcome::Partial;
    }

    let rollback = t.contains("retour") || t.contains("rollback");
    if t.contains("echec") || t.contains("fail") {
        if rollback {
            if t.contains("sans") || t.contains("without") {
                return ClosureOutcome::FailureNoRollback;
            }
            return ClosureOutcome::FailureRollback;
        }
        return ClosureOutcome::FailureNoRollback;
    }

    // Rollback mentioned without any failure keyword still means it went back.
    if rollback {
        return ClosureOutcome::FailureRollback;
    }

    ClosureOutcome::Unknown
}

/// Change types driving timeline box colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Urgent,
    Normal,
    Agile,
    Other,
}

impl ChangeType {
    pub fn from_label(label: &str) -> Self {
        match fold(label).as_str() {
            "urgent" => ChangeType::Urgent,
            "normal" | "standard" => ChangeType::Normal,
            "agile" => ChangeType::Agile,
            _ => ChangeType::Other,
        }
    }

    /// Key used by the configuration color-override map.
    pub fn key(&self) -> &'static str {
        match self {
            ChangeType::Urgent => "urgent",
            ChangeType::Normal => "normal",
            ChangeType::Agile => "agile",
            ChangeType::Other => "other",
        }
    }

    /// Default box fill (RRGGBB): orange, blue, green, grey.
    pub fn default_color(&self) -> &'static str {
        match self {
            ChangeType::Urgent => "FF8C00",
            ChangeType::Normal => "0066CC",
            ChangeType::Agile => "009900",
            ChangeType::Other => "646464",
        }
    }
}
