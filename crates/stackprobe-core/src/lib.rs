//! Stackprobe Core - Foundation crate for the stackprobe enrichment pipeline.
//!
//! This crate provides the shared record schema, pipeline events and
//! configuration management that the client, enricher and CLI
//! crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Configuration error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - `TechCategory` and the per-URL `TechnologyRecord`
//! - [`events`] - Lifecycle events and the sinks that observe them
//!
//! # Example
//!
//! ```rust
//! use stackprobe_core::{TechCategory, TechnologyRecord};
//!
//! let mut record = TechnologyRecord::new("example.com");
//! if let Some(category) = TechCategory::from_labels(&["Web Server"]) {
//!     record.push(category, "nginx 1.25");
//! }
//! assert_eq!(record.technologies(TechCategory::WebServer), ["nginx 1.25"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod events;
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, AppConfig, InputConfig, OutputConfig};
pub use error::{ConfigError, ConfigResult};
pub use events::{EventSink, NullSink, PipelineEvent, RecordingSink, TracingSink};
pub use types::{TechCategory, TechnologyRecord};
