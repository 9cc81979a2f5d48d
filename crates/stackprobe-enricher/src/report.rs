//! Flattening technology records into the tabular report.

use crate::error::{EnrichError, Result};
use crate::table::TableFormat;
use rust_xlsxwriter::Workbook;
use serde::Serialize;
use stackprobe_core::{TechCategory, TechnologyRecord};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Report columns, in output order.
pub const COLUMNS: [&str; 12] = [
    "url",
    "whatcms_link",
    "Blog_CMS",
    "E-commerce_CMS",
    "Programming_Language",
    "Database",
    "CDN",
    "Web_Server",
    "Landing_Page_Builder_CMS",
    "Operating_System",
    "Web_Framework",
    "whatcms_response",
];

/// Separator between technologies sharing a cell.
pub const VALUE_SEPARATOR: &str = ", ";

/// One flattened report row. Multi-valued fields are joined into one cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// Queried URL
    pub url: String,
    /// API lookup link, empty when none was returned
    #[serde(rename = "whatcms_link")]
    pub lookup_link: String,
    /// Blog CMS cell
    #[serde(rename = "Blog_CMS")]
    pub blog_cms: String,
    /// E-commerce CMS cell
    #[serde(rename = "E-commerce_CMS")]
    pub ecommerce_cms: String,
    /// Programming language cell
    #[serde(rename = "Programming_Language")]
    pub programming_language: String,
    /// Database cell
    #[serde(rename = "Database")]
    pub database: String,
    /// CDN cell
    #[serde(rename = "CDN")]
    pub cdn: String,
    /// Web server cell
    #[serde(rename = "Web_Server")]
    pub web_server: String,
    /// Landing page builder cell
    #[serde(rename = "Landing_Page_Builder_CMS")]
    pub landing_page_builder_cms: String,
    /// Operating system cell
    #[serde(rename = "Operating_System")]
    pub operating_system: String,
    /// Web framework cell
    #[serde(rename = "Web_Framework")]
    pub web_framework: String,
    /// Status note of the lookup
    #[serde(rename = "whatcms_response")]
    pub status_note: String,
}

impl ReportRow {
    /// Flatten one record.
    #[must_use]
    pub fn from_record(record: &TechnologyRecord) -> Self {
        let cell = |category| join_values(record.technologies(category));

        Self {
            url: record.url().to_string(),
            lookup_link: record.lookup_link.clone().unwrap_or_default(),
            blog_cms: cell(TechCategory::BlogCms),
            ecommerce_cms: cell(TechCategory::EcommerceCms),
            programming_language: cell(TechCategory::ProgrammingLanguage),
            database: cell(TechCategory::Database),
            cdn: cell(TechCategory::Cdn),
            web_server: cell(TechCategory::WebServer),
            landing_page_builder_cms: cell(TechCategory::LandingPageBuilderCms),
            operating_system: cell(TechCategory::OperatingSystem),
            web_framework: cell(TechCategory::WebFramework),
            status_note: record.status_note.clone(),
        }
    }

    /// Cells in [`COLUMNS`] order.
    #[must_use]
    pub fn cells(&self) -> [&str; 12] {
        [
            &self.url,
            &self.lookup_link,
            &self.blog_cms,
            &self.ecommerce_cms,
            &self.programming_language,
            &self.database,
            &self.cdn,
            &self.web_server,
            &self.landing_page_builder_cms,
            &self.operating_system,
            &self.web_framework,
            &self.status_note,
        ]
    }
}

/// Join technologies for a single cell; an empty list gives `""`.
#[must_use]
pub fn join_values(values: &[String]) -> String {
    values.join(VALUE_SEPARATOR)
}

/// Flatten records into a report, keeping their order.
#[must_use]
pub fn flatten(records: &[TechnologyRecord]) -> Report {
    Report {
        rows: records.iter().map(ReportRow::from_record).collect(),
    }
}

/// The enrichment report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    rows: Vec<ReportRow>,
}

impl Report {
    /// Rows in input order.
    #[must_use]
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the report has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the report to `path`; the extension picks CSV, JSON or XLSX.
    pub fn save(&self, path: &Path) -> Result<()> {
        tracing::info!("Saving output to {}", path.display());

        let format = TableFormat::from_path(path).ok_or_else(|| EnrichError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;

        match format {
            TableFormat::Csv => self.write_csv(File::create(path)?)?,
            TableFormat::Json => self.write_json(BufWriter::new(File::create(path)?))?,
            TableFormat::Xlsx => self.write_xlsx(path)?,
        }

        tracing::info!("Successfully saved output to {}", path.display());
        Ok(())
    }

    /// Write CSV with a header row, even when there are no rows.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        writer.write_record(COLUMNS)?;
        for row in &self.rows {
            writer.write_record(row.cells())?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write a single-sheet workbook: header row, then one row per record.
    /// Empty cells are left blank.
    pub fn write_xlsx(&self, path: &Path) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (col, name) in (0u16..).zip(COLUMNS) {
            worksheet.write_string(0, col, name)?;
        }
        for (row_num, row) in (1u32..).zip(&self.rows) {
            for (col, cell) in (0u16..).zip(row.cells()) {
                if !cell.is_empty() {
                    worksheet.write_string(row_num, col, cell)?;
                }
            }
        }

        workbook.save(path)?;
        Ok(())
    }

    /// Write a JSON array of objects keyed by column name.
    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, &self.rows)?;
        writer.flush()?;
        Ok(())
    }
}
