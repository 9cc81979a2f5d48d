//! Error types for the fingerprint client.

use stackprobe_core::ConfigError;
use thiserror::Error;

/// Errors that escape a fetch instead of being folded into its record.
///
/// Transport, HTTP and payload problems never surface here; they end up in
/// the record's status note. What remains are local faults.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The session was closed before the fetch started
    #[error("client session is closed")]
    SessionClosed,

    /// Client could not be built from configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Problems found while walking an API payload.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Body was not valid JSON
    #[error("{0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Top-level payload was not a JSON object
    #[error("expected a JSON object, found {found}")]
    NotAnObject {
        /// JSON type that was found instead
        found: &'static str,
    },

    /// `results` was present but not a list
    #[error("`results` must be a list, found {found}")]
    ResultsNotAList {
        /// JSON type that was found instead
        found: &'static str,
    },

    /// A `results` entry did not have the expected shape
    #[error("invalid technology entry {index}: {reason}")]
    InvalidEntry {
        /// Position of the entry in `results`
        index: usize,
        /// What was wrong with it
        reason: String,
    },
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
