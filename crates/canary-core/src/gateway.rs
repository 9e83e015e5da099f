//! Orchestration API seam.
//!
//! The controller and the health checks only talk to the orchestrator through
//! [`Gateway`]; the HTTP implementation lives in its own crate.
use std::fmt;

use async_trait::async_trait;
use canary_model::{Container, Endpoint, Resource};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Lifecycle action applied to a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Activate,
    Deactivate,
}

impl ServiceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceAction::Activate => "activate",
            ServiceAction::Deactivate => "deactivate",
        }
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load balancer resource as returned by the orchestrator.
///
/// Only `lbConfig.config` is interpreted; every other field is carried as-is
/// so a store writes back what was read.
#[derive(Debug, Clone, PartialEq)]
pub struct LbEnvelope {
    raw: Value,
}

impl LbEnvelope {
    pub fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    /// Envelope holding only a config body.
    pub fn with_body(body: impl Into<String>) -> Self {
        Self::from_value(Value::Object(Map::new())).with_config(body)
    }

    /// Config body, empty when absent.
    pub fn config(&self) -> &str {
        self.raw
            .get("lbConfig")
            .and_then(|c| c.get("config"))
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Replace the config body, creating `lbConfig` when missing.
    pub fn with_config(mut self, body: impl Into<String>) -> Self {
        if !self.raw.is_object() {
            self.raw = Value::Object(Map::new());
        }
        if let Value::Object(root) = &mut self.raw {
            let lb = root
                .entry("lbConfig")
                .or_insert_with(|| Value::Object(Map::new()));
            if !lb.is_object() {
                *lb = Value::Object(Map::new());
            }
            if let Value::Object(lb) = lb {
                lb.insert("config".to_string(), Value::String(body.into()));
            }
        }
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.raw.get("name").and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.raw
    }

    pub fn into_value(self) -> Value {
        self.raw
    }
}

/// Orchestration API operations used by the canary controller and the watcher.
///
/// Every call takes the [`Endpoint`] explicitly: watch tasks may each target a
/// different orchestrator.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Fetch a load balancer service.
    async fn load_balancer(&self, ep: &Endpoint, lb_id: &str) -> GatewayResult<LbEnvelope>;
    /// Store a load balancer config in a single write.
    async fn store_load_balancer(&self, ep: &Endpoint, lb_id: &str, lb: &LbEnvelope) -> GatewayResult<()>;
    async fn list_load_balancers(&self, ep: &Endpoint) -> GatewayResult<Vec<Resource>>;
    async fn list_stacks(&self, ep: &Endpoint) -> GatewayResult<Vec<Resource>>;
    async fn list_stack_services(&self, ep: &Endpoint, stack_id: &str) -> GatewayResult<Vec<Resource>>;
    async fn service(&self, ep: &Endpoint, service_id: &str) -> GatewayResult<Resource>;
    async fn list_service_instances(&self, ep: &Endpoint, service_id: &str) -> GatewayResult<Vec<Container>>;
    async fn service_action(&self, ep: &Endpoint, service_id: &str, action: ServiceAction) -> GatewayResult<()>;
    async fn restart_container(&self, ep: &Endpoint, container_id: &str) -> GatewayResult<()>;
    /// List environments (projects) visible to the credentials.
    async fn list_environments(&self, ep: &Endpoint) -> GatewayResult<Vec<Resource>>;
}
