//! One health check of a watched service.
use std::fmt::Write;

use canary_core::Gateway;
use canary_model::{Container, Endpoint, HealthState, ServiceRef};
use tracing::debug;

use crate::error::{WatchError, WatchResult};

/// Aggregate health of a service plus its container breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub target: ServiceRef,
    pub service_id: String,
    pub health: HealthState,
    pub containers: Vec<Container>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.health.is_healthy()
    }

    /// Containers reporting healthy.
    pub fn up(&self) -> impl Iterator<Item = &Container> {
        self.containers.iter().filter(|c| c.health_state.is_healthy())
    }

    /// Containers reporting anything else.
    pub fn down(&self) -> impl Iterator<Item = &Container> {
        self.containers.iter().filter(|c| !c.health_state.is_healthy())
    }

    /// Alert message for an unhealthy service, `None` when healthy.
    pub fn alert_text(&self) -> Option<String> {
        if self.is_healthy() {
            return None;
        }
        let mut lines = String::new();
        for c in &self.containers {
            let _ = writeln!(lines, "`{}` - `{}`", c.name, c.health_state);
        }
        Some(format!(
            "Please, check the containers health, the service `{}/{}` actually is `{}` with `{}` up containers and `{}` down containers\n\n{}",
            self.target.stack(),
            self.target.service(),
            self.health,
            self.up().count(),
            self.down().count(),
            lines
        ))
    }
}

/// Resolve `target` by name and read its health and containers.
///
/// Stacks and services are matched by exact name, first match wins.
pub async fn check_once(gateway: &dyn Gateway, ep: &Endpoint, target: &ServiceRef) -> WatchResult<HealthReport> {
    let stacks = gateway.list_stacks(ep).await?;
    let stack = stacks
        .into_iter()
        .find(|s| s.name == target.stack())
        .ok_or_else(|| WatchError::Resolution {
            target: target.to_string(),
            reason: format!("no stack named '{}'", target.stack()),
        })?;

    let services = gateway.list_stack_services(ep, &stack.id).await?;
    let service = services
        .into_iter()
        .find(|s| s.name == target.service())
        .ok_or_else(|| WatchError::Resolution {
            target: target.to_string(),
            reason: format!("no service named '{}' in stack '{}'", target.service(), target.stack()),
        })?;

    let containers = gateway.list_service_instances(ep, &service.id).await?;
    debug!(
        service = %target,
        health = %service.health_state,
        containers = containers.len(),
        "service resolved"
    );

    Ok(HealthReport {
        target: target.clone(),
        service_id: service.id,
        health: service.health_state,
        containers,
    })
}
