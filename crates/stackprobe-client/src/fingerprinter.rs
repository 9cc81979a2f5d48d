//! The seam between the orchestrator and whatever performs lookups.

use crate::error::Result;
use async_trait::async_trait;
use stackprobe_core::TechnologyRecord;

/// Anything that can fingerprint a URL.
///
/// Implementations fold transport, HTTP and payload failures into the
/// returned record's status note. An `Err` means no record could be built
/// at all, and callers drop the URL.
#[async_trait]
pub trait Fingerprinter: Send + Sync {
    /// Look up the technologies behind `url`.
    ///
    /// # Errors
    /// Returns error only for local faults such as a closed session.
    async fn fetch(&self, url: &str) -> Result<TechnologyRecord>;

    /// Release held resources. Calling this more than once is harmless.
    async fn close(&self);
}
