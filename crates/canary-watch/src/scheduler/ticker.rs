use std::sync::Arc;

use canary_core::{AlertSink, Gateway, MetricsHandle, TickOutcome};
use canary_model::{ServiceRef, WatchTask};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::health::check_once;

/// What a single tick needs; cloned into every loop.
#[derive(Clone)]
pub(crate) struct Ticker {
    gateway: Arc<dyn Gateway>,
    sink: Arc<dyn AlertSink>,
    metrics: MetricsHandle,
}

impl Ticker {
    pub(crate) fn new(gateway: Arc<dyn Gateway>, sink: Arc<dyn AlertSink>, metrics: MetricsHandle) -> Self {
        Self { gateway, sink, metrics }
    }

    pub(crate) fn set_metrics(&mut self, metrics: MetricsHandle) {
        self.metrics = metrics;
    }

    /// Check the service once and alert when it is not healthy.
    pub(crate) async fn tick(&self, task: &WatchTask, target: &ServiceRef) -> TickOutcome {
        let started = Instant::now();
        let outcome = match check_once(self.gateway.as_ref(), &task.spec.endpoint, target).await {
            Ok(report) => match report.alert_text() {
                None => {
                    debug!(task = %task.id, service = %target, "service healthy");
                    TickOutcome::Healthy
                }
                Some(text) => {
                    self.alert(task, &text).await;
                    TickOutcome::Unhealthy
                }
            },
            Err(e) => {
                warn!(task = %task.id, service = %target, reason = %e, "health tick failed");
                TickOutcome::Failed
            }
        };
        self.metrics
            .record_tick(outcome, started.elapsed().as_millis() as u64);
        outcome
    }

    async fn alert(&self, task: &WatchTask, text: &str) {
        let channel = task.spec.channel.as_str();
        if channel.is_empty() {
            warn!(task = %task.id, "service unhealthy but watch has no alert channel");
            return;
        }
        let res = self.sink.post(channel, text).await;
        self.metrics.record_alert(res.is_ok());
        if let Err(e) = res {
            warn!(task = %task.id, %channel, reason = %e, "alert delivery failed");
        }
    }
}
