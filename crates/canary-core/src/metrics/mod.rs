//! Metrics collection abstraction for canary mutations and health ticks.
//!
//! Backends (prometheus, statsd, etc) implement [`MetricsBackend`] and are injected
//! into the controller and the scheduler as a [`MetricsHandle`].
mod backend;
pub use backend::{MetricsBackend, MetricsHandle, MutationOutcome, TickOutcome};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
