//! Throttling applied after every fingerprinting request.

use async_trait::async_trait;
use std::time::Duration;

/// Decides how long the client waits once a request has completed.
///
/// The client calls [`RateLimitPolicy::pause`] exactly once per fetch,
/// whether the request succeeded or failed.
#[async_trait]
pub trait RateLimitPolicy: Send + Sync {
    /// Wait before the client is allowed to return.
    async fn pause(&self);
}

/// Sleep for a fixed duration after each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    /// Delay used when nothing else is configured.
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(10);

    /// Create a policy that sleeps for `delay`.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Create a policy that sleeps for `secs` seconds.
    #[must_use]
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// The configured delay.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

#[async_trait]
impl RateLimitPolicy for FixedDelay {
    async fn pause(&self) {
        if !self.delay.is_zero() {
            tracing::trace!(delay = ?self.delay, "rate limit pause");
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Return immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

#[async_trait]
impl RateLimitPolicy for NoDelay {
    async fn pause(&self) {}
}
