use crate::metrics::backend::{MetricsBackend, MutationOutcome, TickOutcome};

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_mutation(&self, _: &str, _: MutationOutcome) {}

    #[inline(always)]
    fn record_tick(&self, _: TickOutcome, _: u64) {}

    #[inline(always)]
    fn record_alert(&self, _: bool) {}
}
