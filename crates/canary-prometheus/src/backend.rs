use std::sync::Arc;

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry, proto::MetricFamily};

use canary_core::{MetricsBackend, MutationOutcome, TickOutcome};

const NAMESPACE: &str = "canary";

/// Prometheus metrics backend.
///
/// All labels are bounded:
/// - `op`: `reweight`, `bump`, `enable`, `disable`
/// - `outcome`: mutation or tick outcome label
/// - `delivered`: `true`, `false`
#[derive(Clone)]
pub struct PrometheusMetrics {
    mutations: CounterVec,
    ticks: CounterVec,
    tick_duration: HistogramVec,
    alerts: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Register every metric on `registry`.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let mutations = CounterVec::new(
            Opts::new("mutations_total", "Load balancer config mutations").namespace(NAMESPACE),
            &["op", "outcome"],
        )?;
        registry.register(Box::new(mutations.clone()))?;

        let ticks = CounterVec::new(
            Opts::new("health_ticks_total", "Health check ticks").namespace(NAMESPACE),
            &["outcome"],
        )?;
        registry.register(Box::new(ticks.clone()))?;

        let tick_duration = HistogramVec::new(
            HistogramOpts::new("health_tick_duration_seconds", "Time spent in one health check tick")
                .namespace(NAMESPACE)
                .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 15.0, 30.0]),
            &["outcome"],
        )?;
        registry.register(Box::new(tick_duration.clone()))?;

        let alerts = CounterVec::new(
            Opts::new("alerts_total", "Alert delivery attempts").namespace(NAMESPACE),
            &["delivered"],
        )?;
        registry.register(Box::new(alerts.clone()))?;

        Ok(Self {
            mutations,
            ticks,
            tick_duration,
            alerts,
            registry,
        })
    }

    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metric families for exposition.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_mutation(&self, op: &str, outcome: MutationOutcome) {
        self.mutations
            .with_label_values(&[op, outcome.as_label()])
            .inc();
    }

    fn record_tick(&self, outcome: TickOutcome, duration_ms: u64) {
        let label = outcome.as_label();
        self.ticks.with_label_values(&[label]).inc();
        self.tick_duration
            .with_label_values(&[label])
            .observe(duration_ms as f64 / 1000.0);
    }

    fn record_alert(&self, delivered: bool) {
        let label = if delivered { "true" } else { "false" };
        self.alerts.with_label_values(&[label]).inc();
    }
}
