//! Input tables.
//!
//! CSV files and `.xlsx` workbooks are read into the same string grid. Any
//! other extension is rejected before a run starts fetching.

use crate::error::{EnrichError, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::io::Read;
use std::path::Path;

/// File formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Comma-separated values
    Csv,
    /// JSON array of objects
    Json,
    /// Excel workbook
    Xlsx,
}

impl TableFormat {
    /// Detect the format from a file extension, case-insensitively.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }
}

/// A header row plus data rows, all cells as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from headers and rows.
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Load a table from `path`.
    ///
    /// `sheet` names the worksheet of an `.xlsx` input; `None` reads the first
    /// one. It is ignored for CSV.
    pub fn load(path: &Path, sheet: Option<&str>) -> Result<Self> {
        tracing::debug!("Loading input data from {}", path.display());

        if !path.exists() {
            return Err(EnrichError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let table = match TableFormat::from_path(path) {
            Some(TableFormat::Csv) => {
                if let Some(sheet) = sheet {
                    tracing::debug!(sheet, "sheet name ignored for CSV input");
                }
                Self::from_csv_reader(std::fs::File::open(path)?)?
            }
            Some(TableFormat::Xlsx) => Self::from_workbook(path, sheet)?,
            _ => {
                return Err(EnrichError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };

        tracing::info!("Loaded {} rows from input file", table.len());
        Ok(table)
    }

    /// Read one worksheet of an `.xlsx` workbook. The first row is the header.
    pub fn from_workbook(path: &Path, sheet: Option<&str>) -> Result<Self> {
        let mut workbook: Xlsx<_> = open_workbook(path)?;
        let names = workbook.sheet_names();

        let name = match sheet {
            Some(sheet) if names.iter().any(|name| name == sheet) => sheet.to_string(),
            Some(sheet) => {
                return Err(EnrichError::SheetNotFound {
                    sheet: sheet.to_string(),
                    available: names,
                })
            }
            None => names
                .first()
                .cloned()
                .ok_or_else(|| EnrichError::EmptyWorkbook {
                    path: path.to_path_buf(),
                })?,
        };

        tracing::debug!(sheet = %name, "reading worksheet");
        let range = workbook.worksheet_range(&name)?;

        let mut rows = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
        let headers = rows.next().unwrap_or_default();

        Ok(Self {
            headers,
            rows: rows.collect(),
        })
    }

    /// Read CSV with a header row. Short rows are padded with empty cells.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len().max(row.len()), String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// Column names in file order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The values of column `name`, top to bottom, or `None` if absent.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<String>> {
        let index = self.headers.iter().position(|header| header == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).cloned().unwrap_or_default())
                .collect(),
        )
    }

    /// Like [`Table::column`], but a missing column is a schema error.
    pub fn require_column(&self, name: &str) -> Result<Vec<String>> {
        self.column(name).ok_or_else(|| EnrichError::MissingColumn {
            column: name.to_string(),
            available: self.headers.clone(),
        })
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        other => other.to_string(),
    }
}
