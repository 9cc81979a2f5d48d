//! Enrichment orchestrator for driving lookups over a batch of URLs.
//!
//! This module provides the `Enricher`, which runs the fingerprint client
//! over URLs one at a time, isolates per-URL failures, and drives the
//! load → enrich → flatten → save workflow.

use crate::error::{EnrichError, Result};
use crate::report::{flatten, Report};
use crate::table::{Table, TableFormat};
use chrono::{DateTime, Utc};
use serde::Serialize;
use stackprobe_client::Fingerprinter;
use stackprobe_core::{EventSink, InputConfig, PipelineEvent, TechnologyRecord, TracingSink};
use std::path::Path;
use std::sync::Arc;

/// Default name of the URL column.
pub const DEFAULT_URL_COLUMN: &str = "url";

/// Input options for [`Enricher::run_workflow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowOptions {
    /// Column holding the URLs
    pub url_column: String,
    /// Sheet holding the URLs (spreadsheet inputs only)
    pub sheet_name: Option<String>,
}

impl WorkflowOptions {
    /// Options taken from the `[input]` config section.
    #[must_use]
    pub fn from_config(config: &InputConfig) -> Self {
        Self {
            url_column: config.url_column.clone(),
            sheet_name: Some(config.sheet_name.clone()),
        }
    }
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            url_column: DEFAULT_URL_COLUMN.to_string(),
            sheet_name: None,
        }
    }
}

/// Outcome of a completed workflow.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowSummary {
    /// URLs read from the input
    pub total: usize,
    /// Rows written to the report
    pub emitted: usize,
    /// URLs left out of the report
    pub dropped: usize,
    /// When the workflow started
    pub started_at: DateTime<Utc>,
    /// When the report was saved
    pub finished_at: DateTime<Utc>,
}

/// Drives fingerprint lookups over a batch of URLs.
///
/// URLs are processed strictly one after another. A fetch that returns an
/// error-flagged record is kept; a fetch that fails outright drops that URL
/// and the batch continues.
pub struct Enricher {
    /// Lookup backend
    client: Arc<dyn Fingerprinter>,
    /// Observer for lifecycle events
    events: Arc<dyn EventSink>,
}

impl Enricher {
    /// Create an enricher that reports progress through `tracing`.
    #[must_use]
    pub fn new(client: Arc<dyn Fingerprinter>) -> Self {
        Self {
            client,
            events: Arc::new(TracingSink),
        }
    }

    /// Replace the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Look up every URL in order, returning one record per URL that did not
    /// fail outright.
    pub async fn enrich(&self, urls: &[String]) -> Vec<TechnologyRecord> {
        let total = urls.len();
        self.events.emit(&PipelineEvent::RunStarted { total });

        let mut records = Vec::with_capacity(total);

        for (index, url) in urls.iter().enumerate() {
            self.events.emit(&PipelineEvent::RequestStarted {
                index: index + 1,
                total,
                url: url.clone(),
            });

            match self.client.fetch(url).await {
                Ok(record) => {
                    self.events.emit(&PipelineEvent::RequestCompleted {
                        url: url.clone(),
                        status_note: record.status_note.clone(),
                        technologies: record.technology_count(),
                    });
                    records.push(record);
                }
                Err(e) => {
                    self.events.emit(&PipelineEvent::RecordDropped {
                        url: url.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        self.events.emit(&PipelineEvent::RunFinished {
            total,
            emitted: records.len(),
            dropped: total - records.len(),
        });

        records
    }

    /// Enrich the URLs in `url_column` and flatten them into a report.
    ///
    /// The column is checked before any lookup is issued.
    pub async fn enrich_table(&self, table: &Table, url_column: &str) -> Result<Report> {
        let urls = table.require_column(url_column)?;
        let records = self.enrich(&urls).await;
        Ok(flatten(&records))
    }

    /// Load `input`, enrich it and save the report to `output`.
    ///
    /// An output extension that cannot be written fails before the input is
    /// read. The client is closed exactly once, whether or not the workflow
    /// succeeds.
    pub async fn run_workflow(
        &self,
        input: &Path,
        output: &Path,
        options: &WorkflowOptions,
    ) -> Result<WorkflowSummary> {
        let started_at = Utc::now();
        let outcome = self.run_stages(input, output, options).await;

        self.client.close().await;

        match outcome {
            Ok((total, emitted)) => {
                tracing::info!("Enrichment workflow completed successfully");
                Ok(WorkflowSummary {
                    total,
                    emitted,
                    dropped: total - emitted,
                    started_at,
                    finished_at: Utc::now(),
                })
            }
            Err(e) => {
                tracing::error!("Enrichment workflow failed: {}", e);
                Err(e)
            }
        }
    }

    async fn run_stages(
        &self,
        input: &Path,
        output: &Path,
        options: &WorkflowOptions,
    ) -> Result<(usize, usize)> {
        if TableFormat::from_path(output).is_none() {
            return Err(EnrichError::UnsupportedFormat {
                path: output.to_path_buf(),
            });
        }

        let table = Table::load(input, options.sheet_name.as_deref())?;
        let report = self.enrich_table(&table, &options.url_column).await?;
        report.save(output)?;
        Ok((table.len(), report.len()))
    }
}
