//! Per-request data passed explicitly through every cart operation.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Correlation id and deadline for one inbound request.
///
/// The deadline is absolute. Every store and catalog call made on behalf of
/// the request is bounded by it, so a stuck backend cannot hold the caller
/// past the deadline.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub correlation_id: String,
    pub deadline: Instant,
}

/// Returned by [`RequestContext::bound`] when the deadline passes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineExceeded;

impl RequestContext {
    /// A context with a fresh correlation id and `timeout` from now.
    pub fn new(timeout: Duration) -> Self {
        Self::with_correlation_id(uuid::Uuid::new_v4().to_string(), timeout)
    }

    pub fn with_correlation_id(correlation_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            deadline: Instant::now() + timeout,
        }
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Runs `fut` until it completes or the deadline passes.
    pub async fn bound<F: Future>(&self, fut: F) -> Result<F::Output, DeadlineExceeded> {
        tokio::time::timeout_at(self.deadline, fut)
            .await
            .map_err(|_| DeadlineExceeded)
    }
}
