//! Stackprobe Enricher - Batch enrichment orchestration.
//!
//! This crate turns a column of URLs into a technology report. It runs the
//! fingerprint client over each URL in turn, keeps going when individual
//! lookups fail, flattens the records into fixed report columns, and handles
//! loading the input table and saving the report.
//!
//! # Example
//!
//! ```rust,ignore
//! use stackprobe_client::FingerprintClient;
//! use stackprobe_enricher::{Enricher, WorkflowOptions};
//! use std::sync::Arc;
//!
//! let client = Arc::new(FingerprintClient::new(api_key)?);
//! let enricher = Enricher::new(client);
//!
//! let summary = enricher
//!     .run_workflow(&input, &output, &WorkflowOptions::default())
//!     .await?;
//! println!("{} of {} URLs enriched", summary.emitted, summary.total);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod table;

// Re-export commonly used types
pub use error::{EnrichError, Result};
pub use orchestrator::{Enricher, WorkflowOptions, WorkflowSummary, DEFAULT_URL_COLUMN};
pub use report::{flatten, join_values, Report, ReportRow, COLUMNS};
pub use table::{Table, TableFormat};
