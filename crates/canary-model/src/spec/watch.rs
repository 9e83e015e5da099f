use serde::{Deserialize, Serialize};

use crate::{
    domain::{ChannelId, Endpoint, ServiceRef, TaskId},
    error::{ModelError, ModelResult},
};

/// Declarative description of a health watch, as submitted by an operator.
///
/// Field names on the wire follow the persisted record layout:
/// `service`, `channelToSendAlert`, `rancherUrl`, `accessKey`, `secretKey`, `projectId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchSpec {
    /// Target service as typed by the operator (`stackName/serviceName`).
    ///
    /// Kept verbatim; it is resolved against the API on every tick.
    pub service: String,
    /// Where unhealthy reports are posted.
    #[serde(rename = "channelToSendAlert")]
    pub channel: ChannelId,
    /// Credential snapshot taken when the watch was created.
    #[serde(flatten)]
    pub endpoint: Endpoint,
}

impl WatchSpec {
    pub fn new(service: impl Into<String>, channel: impl Into<ChannelId>, endpoint: Endpoint) -> Self {
        Self {
            service: service.into(),
            channel: channel.into(),
            endpoint,
        }
    }

    /// Required before a descriptor may be persisted.
    ///
    /// Rules:
    /// - orchestration URL, access key and secret key are not blank;
    /// - `service` is not blank.
    pub fn validate(&self) -> ModelResult<()> {
        self.endpoint.validate()?;
        if self.service.trim().is_empty() {
            return Err(ModelError::MissingField("service"));
        }
        Ok(())
    }

    /// Parse the target into a [`ServiceRef`].
    pub fn service_ref(&self) -> ModelResult<ServiceRef> {
        self.service.parse()
    }
}

/// A persisted watch descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchTask {
    pub id: TaskId,
    #[serde(flatten)]
    pub spec: WatchSpec,
}

impl WatchTask {
    pub fn new(id: TaskId, spec: WatchSpec) -> Self {
        Self { id, spec }
    }
}
