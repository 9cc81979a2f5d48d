use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors of an enrichment run.
///
/// Per-URL failures never show up here; they are recorded in the report or
/// the URL is dropped.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("column '{column}' not found in input table (available: {})", available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("unsupported format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("worksheet '{sheet}' not found (available: {})", available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    #[error("workbook has no worksheets: {}", path.display())]
    EmptyWorkbook { path: PathBuf },

    #[error("workbook read error: {0}")]
    XlsxRead(#[from] calamine::XlsxError),

    #[error("workbook write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EnrichError>;
