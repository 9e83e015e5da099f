use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Orchestration API coordinates and credentials.
///
/// Passed explicitly into every gateway call. Watch tasks keep their own copy
/// taken at creation time, so switching the operator's active endpoint later
/// never retargets a running task.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Endpoint {
    /// Base URL of the API, e.g. `https://rancher.example.com/v2-beta/projects`.
    #[serde(rename = "rancherUrl")]
    pub base_url: String,
    pub access_key: String,
    pub secret_key: String,
    /// Project (environment) ID prepended to every resource path.
    pub project_id: String,
}

impl Endpoint {
    pub fn new(
        base_url: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            project_id: project_id.into(),
        }
    }

    /// Same credentials pointed at another project.
    pub fn with_project(&self, project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..self.clone()
        }
    }

    /// Check that the URL and both keys are present.
    pub fn validate(&self) -> ModelResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ModelError::MissingField("rancherUrl"));
        }
        if self.access_key.trim().is_empty() {
            return Err(ModelError::MissingField("accessKey"));
        }
        if self.secret_key.trim().is_empty() {
            return Err(ModelError::MissingField("secretKey"));
        }
        Ok(())
    }

    /// Credentials for HTTP basic auth, if both keys are set.
    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        if self.access_key.is_empty() || self.secret_key.is_empty() {
            return None;
        }
        Some((self.access_key.as_str(), self.secret_key.as_str()))
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("base_url", &self.base_url)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("project_id", &self.project_id)
            .finish()
    }
}
