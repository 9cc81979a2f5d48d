//! Lifecycle events emitted by the enrichment pipeline.
//!
//! The orchestrator reports run progress only as [`PipelineEvent`]s sent to
//! an [`EventSink`], and the sink decides how to present them. The client
//! still logs failure detail (status codes, transport errors) with `tracing`
//! at warn level.

use serde::Serialize;
use std::sync::{Mutex, PoisonError};

/// A discrete step in an enrichment run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// A batch of URLs is about to be processed.
    RunStarted {
        /// Number of URLs in the batch
        total: usize,
    },
    /// A fingerprinting request is about to be issued.
    RequestStarted {
        /// 1-based position in the batch
        index: usize,
        /// Number of URLs in the batch
        total: usize,
        /// Target URL
        url: String,
    },
    /// A fingerprinting request finished and produced a record.
    RequestCompleted {
        /// Target URL
        url: String,
        /// The record's status note
        status_note: String,
        /// Number of technologies recorded
        technologies: usize,
    },
    /// A URL produced no record and is left out of the report.
    RecordDropped {
        /// Target URL
        url: String,
        /// Why the record could not be built
        reason: String,
    },
    /// The batch finished.
    RunFinished {
        /// Number of URLs in the batch
        total: usize,
        /// Records produced
        emitted: usize,
        /// URLs dropped
        dropped: usize,
    },
}

/// Observer for pipeline events.
pub trait EventSink: Send + Sync {
    /// Receive one event.
    fn emit(&self, event: &PipelineEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::RunStarted { total } => {
                tracing::debug!(total, "starting enrichment");
            }
            PipelineEvent::RequestStarted { index, total, url } => {
                tracing::info!("Processing {}/{}: {}", index, total, url);
            }
            PipelineEvent::RequestCompleted {
                url,
                status_note,
                technologies,
            } => {
                tracing::debug!(%url, %status_note, technologies, "lookup completed");
            }
            PipelineEvent::RecordDropped { url, reason } => {
                tracing::error!("Failed to process {}: {}", url, reason);
            }
            PipelineEvent::RunFinished {
                total,
                emitted,
                dropped,
            } => {
                tracing::info!(emitted, dropped, "Completed enrichment of {} URLs", total);
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &PipelineEvent) {}
}

/// Collects events in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingSink {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    #[must_use]
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &PipelineEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
