use std::fmt;

use serde::{Deserialize, Serialize};

/// Health value the orchestration API reports for a healthy service or container.
pub const HEALTHY: &str = "healthy";

/// Health status as reported by the orchestration API.
///
/// Anything other than [`HEALTHY`] counts as unhealthy; an absent value is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HealthState(String);

impl HealthState {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn healthy() -> Self {
        Self(HEALTHY.to_string())
    }

    #[inline]
    pub fn is_healthy(&self) -> bool {
        self.0 == HEALTHY
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HealthState {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One item of a `data: [...]` list envelope (stack, service, instance, load balancer, project).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resource {
    pub id: String,
    pub name: String,
    /// Lifecycle state (`active`, `inactive`, `running`, ...).
    pub state: String,
    pub health_state: HealthState,
}

impl Resource {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_health(mut self, health: impl Into<HealthState>) -> Self {
        self.health_state = health.into();
        self
    }
}

/// Container instance backing a service.
pub type Container = Resource;
