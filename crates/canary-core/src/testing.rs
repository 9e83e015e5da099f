//! In-memory [`Gateway`] and [`AlertSink`] for tests.
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use canary_model::{Container, Endpoint, HealthState, Resource};
use serde_json::json;

use crate::alert::{AlertError, AlertSink};
use crate::gateway::{Gateway, GatewayError, GatewayResult, LbEnvelope, ServiceAction};

#[derive(Default)]
struct FakeState {
    lbs: HashMap<String, LbEnvelope>,
    stacks: Vec<Resource>,
    services: HashMap<String, Vec<Resource>>,
    instances: HashMap<String, Vec<Container>>,
    stores: Vec<(String, String)>,
    calls: usize,
    failing: bool,
}

/// Orchestrator double keeping load balancers, stacks and services in memory.
///
/// Every call is counted; [`FakeGateway::set_failing`] turns every call into a
/// transport error.
#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<FakeState>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn with_lb(self, id: &str, name: &str, body: &str) -> Self {
        let lb = LbEnvelope::from_value(json!({"id": id, "name": name})).with_config(body);
        self.state().lbs.insert(id.to_string(), lb);
        self
    }

    pub fn with_raw_lb(self, id: &str, raw: serde_json::Value) -> Self {
        self.state().lbs.insert(id.to_string(), LbEnvelope::from_value(raw));
        self
    }

    pub fn with_stack(self, id: &str, name: &str) -> Self {
        self.state().stacks.push(Resource::new(id, name));
        self
    }

    pub fn with_service(self, stack_id: &str, service: Resource) -> Self {
        self.state()
            .services
            .entry(stack_id.to_string())
            .or_default()
            .push(service);
        self
    }

    pub fn with_instances(self, service_id: &str, instances: Vec<Container>) -> Self {
        self.state().instances.insert(service_id.to_string(), instances);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.state().failing = failing;
    }

    pub fn set_service_health(&self, service_id: &str, health: &str) {
        let mut st = self.state();
        for svc in st.services.values_mut().flatten() {
            if svc.id == service_id {
                svc.health_state = HealthState::new(health);
            }
        }
    }

    /// Number of gateway calls made so far.
    pub fn calls(&self) -> usize {
        self.state().calls
    }

    /// `(lb_id, body)` of every store, in order.
    pub fn stores(&self) -> Vec<(String, String)> {
        self.state().stores.clone()
    }

    pub fn lb_body(&self, id: &str) -> Option<String> {
        self.state().lbs.get(id).map(|lb| lb.config().to_string())
    }

    pub fn lb_value(&self, id: &str) -> Option<serde_json::Value> {
        self.state().lbs.get(id).map(|lb| lb.as_value().clone())
    }

    fn enter(&self) -> GatewayResult<MutexGuard<'_, FakeState>> {
        let mut st = self.state();
        st.calls += 1;
        if st.failing {
            return Err(GatewayError::Transport("connection refused".into()));
        }
        Ok(st)
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn load_balancer(&self, _: &Endpoint, lb_id: &str) -> GatewayResult<LbEnvelope> {
        let st = self.enter()?;
        st.lbs
            .get(lb_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("loadBalancerServices/{lb_id}")))
    }

    async fn store_load_balancer(&self, _: &Endpoint, lb_id: &str, lb: &LbEnvelope) -> GatewayResult<()> {
        let mut st = self.enter()?;
        st.stores.push((lb_id.to_string(), lb.config().to_string()));
        st.lbs.insert(lb_id.to_string(), lb.clone());
        Ok(())
    }

    async fn list_load_balancers(&self, _: &Endpoint) -> GatewayResult<Vec<Resource>> {
        let st = self.enter()?;
        let mut out: Vec<Resource> = st
            .lbs
            .iter()
            .map(|(id, lb)| Resource::new(id.as_str(), lb.name().unwrap_or_default()))
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }

    async fn list_stacks(&self, _: &Endpoint) -> GatewayResult<Vec<Resource>> {
        Ok(self.enter()?.stacks.clone())
    }

    async fn list_stack_services(&self, _: &Endpoint, stack_id: &str) -> GatewayResult<Vec<Resource>> {
        Ok(self.enter()?.services.get(stack_id).cloned().unwrap_or_default())
    }

    async fn service(&self, _: &Endpoint, service_id: &str) -> GatewayResult<Resource> {
        let st = self.enter()?;
        if let Some(svc) = st.services.values().flatten().find(|s| s.id == service_id) {
            return Ok(svc.clone());
        }
        st.lbs
            .get(service_id)
            .map(|lb| Resource::new(service_id, lb.name().unwrap_or_default()))
            .ok_or_else(|| GatewayError::NotFound(format!("services/{service_id}")))
    }

    async fn list_service_instances(&self, _: &Endpoint, service_id: &str) -> GatewayResult<Vec<Container>> {
        Ok(self.enter()?.instances.get(service_id).cloned().unwrap_or_default())
    }

    async fn service_action(&self, _: &Endpoint, _: &str, _: ServiceAction) -> GatewayResult<()> {
        self.enter().map(drop)
    }

    async fn restart_container(&self, _: &Endpoint, _: &str) -> GatewayResult<()> {
        self.enter().map(drop)
    }

    async fn list_environments(&self, _: &Endpoint) -> GatewayResult<Vec<Resource>> {
        self.enter().map(|_| Vec::new())
    }
}

/// Alert sink recording every posted message.
#[derive(Default)]
pub struct RecordingSink {
    posts: Mutex<Vec<(String, String)>>,
    failing: Mutex<bool>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(|e| e.into_inner()) = failing;
    }

    /// `(channel, text)` of every accepted post.
    pub fn posts(&self) -> Vec<(String, String)> {
        self.posts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn post(&self, channel: &str, text: &str) -> Result<(), AlertError> {
        if *self.failing.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(AlertError::Transport("sink offline".into()));
        }
        self.posts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((channel.to_string(), text.to_string()));
        Ok(())
    }
}
