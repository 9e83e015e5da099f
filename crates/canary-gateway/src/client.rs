use async_trait::async_trait;
use canary_core::gateway::{Gateway, GatewayError, GatewayResult, LbEnvelope, ServiceAction};
use canary_model::{Container, Endpoint, Resource};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::config::HttpConfig;
use crate::envelope::Collection;

/// Orchestration API client over HTTP with basic auth.
#[derive(Debug, Clone)]
pub struct RancherGateway {
    client: Client,
}

impl RancherGateway {
    pub fn new(cfg: &HttpConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(cfg.timeout())
            .danger_accept_invalid_certs(cfg.accept_invalid_certs)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn project_url(ep: &Endpoint, path: &str) -> GatewayResult<String> {
        ep.validate()
            .map_err(|e| GatewayError::InvalidEndpoint(e.to_string()))?;
        if ep.project_id.trim().is_empty() {
            return Err(GatewayError::InvalidEndpoint("missing field: projectId".into()));
        }
        Ok(format!(
            "{}/{}/{}",
            ep.base_url.trim_end_matches('/'),
            ep.project_id.trim(),
            path
        ))
    }

    fn request(&self, method: Method, ep: &Endpoint, url: &str) -> RequestBuilder {
        let rb = self.client.request(method, url);
        match ep.basic_auth() {
            Some((user, pass)) => rb.basic_auth(user, Some(pass)),
            None => rb,
        }
    }

    async fn send(rb: RequestBuilder, url: &str) -> GatewayResult<Response> {
        let resp = rb
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = resp.status();
        debug!(%url, status = status.as_u16(), "orchestrator response");
        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, ep: &Endpoint, url: &str) -> GatewayResult<T> {
        let resp = Self::send(self.request(Method::GET, ep, url), url).await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(format!("{url}: {e}")))
    }

    async fn list(&self, ep: &Endpoint, path: &str) -> GatewayResult<Vec<Resource>> {
        let url = Self::project_url(ep, path)?;
        let page: Collection<Resource> = self.get_json(ep, &url).await?;
        Ok(page.data)
    }

    async fn post_action(&self, ep: &Endpoint, path: &str, action: &str) -> GatewayResult<()> {
        let url = format!("{}?action={action}", Self::project_url(ep, path)?);
        Self::send(self.request(Method::POST, ep, &url), &url).await?;
        Ok(())
    }
}

#[async_trait]
impl Gateway for RancherGateway {
    #[instrument(level = "debug", skip(self, ep))]
    async fn load_balancer(&self, ep: &Endpoint, lb_id: &str) -> GatewayResult<LbEnvelope> {
        let url = Self::project_url(ep, &format!("loadBalancerServices/{lb_id}"))?;
        let raw: Value = self.get_json(ep, &url).await?;
        Ok(LbEnvelope::from_value(raw))
    }

    #[instrument(level = "debug", skip(self, ep, lb))]
    async fn store_load_balancer(&self, ep: &Endpoint, lb_id: &str, lb: &LbEnvelope) -> GatewayResult<()> {
        let url = Self::project_url(ep, &format!("loadBalancerServices/{lb_id}"))?;
        let lb_config = lb
            .as_value()
            .get("lbConfig")
            .cloned()
            .unwrap_or_else(|| json!({"config": lb.config()}));
        let payload = json!({ "lbConfig": lb_config });

        Self::send(self.request(Method::PUT, ep, &url).json(&payload), &url).await?;
        Ok(())
    }

    async fn list_load_balancers(&self, ep: &Endpoint) -> GatewayResult<Vec<Resource>> {
        self.list(ep, "loadBalancerServices").await
    }

    async fn list_stacks(&self, ep: &Endpoint) -> GatewayResult<Vec<Resource>> {
        self.list(ep, "stacks").await
    }

    async fn list_stack_services(&self, ep: &Endpoint, stack_id: &str) -> GatewayResult<Vec<Resource>> {
        self.list(ep, &format!("stacks/{stack_id}/services")).await
    }

    async fn service(&self, ep: &Endpoint, service_id: &str) -> GatewayResult<Resource> {
        let url = Self::project_url(ep, &format!("services/{service_id}"))?;
        self.get_json(ep, &url).await
    }

    async fn list_service_instances(&self, ep: &Endpoint, service_id: &str) -> GatewayResult<Vec<Container>> {
        self.list(ep, &format!("services/{service_id}/instances")).await
    }

    #[instrument(level = "debug", skip(self, ep))]
    async fn service_action(&self, ep: &Endpoint, service_id: &str, action: ServiceAction) -> GatewayResult<()> {
        self.post_action(ep, &format!("services/{service_id}"), action.as_str())
            .await
    }

    #[instrument(level = "debug", skip(self, ep))]
    async fn restart_container(&self, ep: &Endpoint, container_id: &str) -> GatewayResult<()> {
        self.post_action(ep, &format!("containers/{container_id}"), "restart")
            .await
    }

    async fn list_environments(&self, ep: &Endpoint) -> GatewayResult<Vec<Resource>> {
        ep.validate()
            .map_err(|e| GatewayError::InvalidEndpoint(e.to_string()))?;
        let url = ep.base_url.trim_end_matches('/').to_string();
        let page: Collection<Resource> = self.get_json(ep, &url).await?;
        Ok(page.data)
    }
}
