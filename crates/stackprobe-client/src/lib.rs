//! Stackprobe Client - Fingerprinting API access.
//!
//! This crate talks to the technology fingerprinting API and turns each
//! response into a [`TechnologyRecord`](stackprobe_core::TechnologyRecord).
//! A single URL's failure never escapes as an error: transport problems,
//! non-200 statuses and malformed payloads are all recorded in the record's
//! status note.
//!
//! # Example
//!
//! ```rust,no_run
//! use stackprobe_client::{FingerprintClient, FixedDelay};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FingerprintClient::new("my-api-key")?
//!     .with_rate_limit(Arc::new(FixedDelay::from_secs(10)));
//!
//! let record = client.fetch("example.com").await?;
//! println!("{}: {}", record.url(), record.status_note);
//!
//! client.close().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod client;
pub mod error;
pub mod fingerprinter;
#[allow(missing_docs)]
pub mod parser;
pub mod rate_limit;

// Re-export commonly used types
pub use client::{FingerprintClient, DEFAULT_TIMEOUT};
pub use error::{ClientError, ParseError, Result};
pub use fingerprinter::Fingerprinter;
pub use parser::ResponseParser;
pub use rate_limit::{FixedDelay, NoDelay, RateLimitPolicy};
