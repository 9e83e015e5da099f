use std::sync::Arc;

/// Outcome of a load balancer mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// New config stored.
    Success,
    /// Rejected by validation, no store performed.
    Rejected,
    /// Orchestration API failed.
    Failure,
}

impl MutationOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            MutationOutcome::Success => "success",
            MutationOutcome::Rejected => "rejected",
            MutationOutcome::Failure => "failure",
        }
    }
}

/// Outcome of a single health check tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Service reported healthy.
    Healthy,
    /// Service unhealthy, alert attempted.
    Unhealthy,
    /// Tick aborted by resolution or upstream error.
    Failed,
}

impl TickOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            TickOutcome::Healthy => "healthy",
            TickOutcome::Unhealthy => "unhealthy",
            TickOutcome::Failed => "failed",
        }
    }
}

/// Backend metrics collection interface.
///
/// Implementations are injected into the canary controller and the health scheduler.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record a finished canary mutation.
    ///
    /// # Arguments
    /// - `op`: Operation name (`reweight`, `bump`, `enable`, `disable`)
    /// - `outcome`: How the mutation terminated
    fn record_mutation(&self, op: &str, outcome: MutationOutcome);
    /// Record a finished health check tick.
    ///
    /// # Arguments
    /// - `outcome`: Tick classification
    /// - `duration_ms`: Time spent talking to the orchestration API
    fn record_tick(&self, outcome: TickOutcome, duration_ms: u64);
    /// Record an alert delivery attempt.
    fn record_alert(&self, delivered: bool);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
