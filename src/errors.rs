//! Unified application error type.
//! All modules (dataset, core, pptx, deck, cli) return AppError to keep the
//! error handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    // ---------------------------
    // Dataset errors
    // ---------------------------
    #[error("Could not load dataset: {0}")]
    Load(String),

    #[error("Missing required column(s): {missing:?}. Present: {present:?}")]
    Schema {
        missing: Vec<String>,
        present: Vec<String>,
    },

    #[error("Unrecognized date/datetime {value:?} in column '{column}', row {row}")]
    DateFormat {
        value: String,
        column: String,
        row: usize,
    },

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid separator: {0}")]
    InvalidSeparator(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Presentation errors
    // ---------------------------
    #[error("Template error: {0}")]
    Template(String),
}

pub type AppResult<T> = Result<T, AppError>;
