//! Canary controller: fetch a load balancer config, mutate it, store it back.
mod lock;

use std::sync::Arc;

use canary_model::{Endpoint, Weights};
use tracing::{debug, info, instrument, warn};

use crate::alert::AlertSink;
use crate::config::{CommentState, ConfigText};
use crate::controller::lock::LbLocks;
use crate::error::{CanaryError, CanaryResult};
use crate::gateway::{Gateway, GatewayError, LbEnvelope};
use crate::metrics::{MetricsHandle, MutationOutcome, noop_metrics};
use crate::mutator;

/// Weight step used by [`CanaryController::bump_by_ten`].
pub const BUMP_STEP: i32 = 10;

/// Read-only view of a load balancer's canary config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanaryInfo {
    pub lb_id: String,
    pub body: String,
    pub state: CommentState,
    /// `None` when the body has no usable `new`/`old` pair.
    pub weights: Option<(u32, u32)>,
}

/// Result of a stored mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanaryUpdate {
    /// Config body as stored.
    pub body: String,
    /// Weights written, for reweight operations.
    pub weights: Option<Weights>,
}

/// Sequences gateway reads and writes around the pure mutators.
///
/// At most one store is issued per call and only after the mutation succeeded.
pub struct CanaryController {
    gateway: Arc<dyn Gateway>,
    metrics: MetricsHandle,
    locks: LbLocks,
}

impl CanaryController {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            metrics: noop_metrics(),
            locks: LbLocks::default(),
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Current body, comment state and weights of a load balancer.
    #[instrument(level = "debug", skip(self, ep, lb_id), fields(lb = %lb_id))]
    pub async fn info(&self, ep: &Endpoint, lb_id: &str) -> CanaryResult<CanaryInfo> {
        let envelope = self.fetch(ep, lb_id).await?;
        let body = envelope.config().to_string();
        let state = ConfigText::parse(&body).comment_state();
        let weights = mutator::current_weights(&body).ok();
        Ok(CanaryInfo {
            lb_id: lb_id.to_string(),
            body,
            state,
            weights,
        })
    }

    /// Weights currently written on the `new` and `old` lines.
    pub async fn current_weights(&self, ep: &Endpoint, lb_id: &str) -> CanaryResult<(u32, u32)> {
        let envelope = self.fetch(ep, lb_id).await?;
        mutator::current_weights(envelope.config())
    }

    /// Set the `new`/`old` split.
    ///
    /// The weight sum is checked before anything is fetched.
    #[instrument(level = "debug", skip(self, ep, lb_id), fields(lb = %lb_id))]
    pub async fn update_weights(&self, ep: &Endpoint, lb_id: &str, new: i32, old: i32) -> CanaryResult<CanaryUpdate> {
        let weights = match Weights::new(new, old) {
            Ok(w) => w,
            Err(_) => {
                self.metrics.record_mutation("reweight", MutationOutcome::Rejected);
                return Err(CanaryError::InvalidWeightSum { new, old });
            }
        };
        self.mutate(ep, lb_id, "reweight", |body| {
            Ok((mutator::reweight_to(body, weights)?, Some(weights)))
        })
        .await
    }

    /// Shift ten points of traffic from `old` to `new`.
    #[instrument(level = "debug", skip(self, ep, lb_id), fields(lb = %lb_id))]
    pub async fn bump_by_ten(&self, ep: &Endpoint, lb_id: &str) -> CanaryResult<CanaryUpdate> {
        self.mutate(ep, lb_id, "bump", |body| {
            let (new, old) = mutator::current_weights(body)?;
            let (new, old) = (clamp_weight(new), clamp_weight(old));
            let current = Weights::new(new, old).map_err(|_| CanaryError::InvalidWeightSum { new, old })?;
            let weights = current.shifted(BUMP_STEP).map_err(|_| CanaryError::InvalidWeightSum {
                new: new + BUMP_STEP,
                old: old - BUMP_STEP,
            })?;
            Ok((mutator::reweight_to(body, weights)?, Some(weights)))
        })
        .await
    }

    /// Comment out (`false`) or uncomment (`true`) the whole config body.
    #[instrument(level = "debug", skip(self, ep, lb_id), fields(lb = %lb_id))]
    pub async fn set_canary_enabled(&self, ep: &Endpoint, lb_id: &str, enabled: bool) -> CanaryResult<CanaryUpdate> {
        let op = if enabled { "enable" } else { "disable" };
        self.mutate(ep, lb_id, op, |body| {
            let out = if enabled {
                mutator::enable(body)?
            } else {
                mutator::disable(body)?
            };
            Ok((out, None))
        })
        .await
    }

    /// Post a canary update notice to `channel`.
    ///
    /// The service name is looked up on the orchestrator; the id is used when
    /// that lookup fails.
    pub async fn announce(
        &self,
        ep: &Endpoint,
        lb_id: &str,
        weights: Weights,
        channel: &str,
        sink: &dyn AlertSink,
    ) -> CanaryResult<()> {
        let name = match self.gateway.service(ep, lb_id).await {
            Ok(svc) if !svc.name.is_empty() => svc.name,
            Ok(_) => lb_id.to_string(),
            Err(e) => {
                debug!(lb = %lb_id, error = %e, "service name lookup failed, announcing by id");
                lb_id.to_string()
            }
        };
        let text = announcement(&name, weights);
        let res = sink.post(channel, &text).await;
        self.metrics.record_alert(res.is_ok());
        res.map_err(CanaryError::from)
    }

    async fn fetch(&self, ep: &Endpoint, lb_id: &str) -> CanaryResult<LbEnvelope> {
        match self.gateway.load_balancer(ep, lb_id).await {
            Ok(lb) => Ok(lb),
            Err(GatewayError::NotFound(_)) => Err(CanaryError::ConfigNotFound { lb: lb_id.to_string() }),
            Err(e) => Err(CanaryError::UpstreamUnavailable(e)),
        }
    }

    async fn mutate<F>(&self, ep: &Endpoint, lb_id: &str, op: &'static str, apply: F) -> CanaryResult<CanaryUpdate>
    where
        F: FnOnce(&str) -> CanaryResult<(String, Option<Weights>)>,
    {
        let res = self.mutate_inner(ep, lb_id, apply).await;
        let outcome = match &res {
            Ok(_) => MutationOutcome::Success,
            Err(CanaryError::UpstreamUnavailable(_)) => MutationOutcome::Failure,
            Err(_) => MutationOutcome::Rejected,
        };
        self.metrics.record_mutation(op, outcome);

        match &res {
            Ok(update) => info!(lb = %lb_id, op, weights = ?update.weights, "canary config stored"),
            Err(e) => warn!(lb = %lb_id, op, error = %e, "canary mutation failed"),
        }
        res
    }

    async fn mutate_inner<F>(&self, ep: &Endpoint, lb_id: &str, apply: F) -> CanaryResult<CanaryUpdate>
    where
        F: FnOnce(&str) -> CanaryResult<(String, Option<Weights>)>,
    {
        let _guard = self.locks.acquire(lb_id).await;

        let envelope = self.fetch(ep, lb_id).await?;
        if envelope.config().is_empty() {
            return Err(CanaryError::ConfigNotFound { lb: lb_id.to_string() });
        }
        let (body, weights) = apply(envelope.config())?;

        let envelope = envelope.with_config(body.clone());
        self.gateway.store_load_balancer(ep, lb_id, &envelope).await?;
        Ok(CanaryUpdate { body, weights })
    }
}

/// Weight read from a config, saturated into `i32`.
fn clamp_weight(w: u32) -> i32 {
    i32::try_from(w).unwrap_or(i32::MAX)
}

/// Text of a canary update notice.
pub fn announcement(service: &str, weights: Weights) -> String {
    format!(
        "Canary of `{service}` has been updated.\nNew version: `{}`\nOld version: `{}`",
        weights.new_weight(),
        weights.old_weight()
    )
}

#[cfg(test)]
mod tests;
