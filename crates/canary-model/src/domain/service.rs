use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// `stackName/serviceName` pair identifying a service to watch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceRef {
    stack: String,
    service: String,
}

impl ServiceRef {
    pub fn new(stack: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            stack: stack.into(),
            service: service.into(),
        }
    }

    #[inline]
    pub fn stack(&self) -> &str {
        &self.stack
    }

    #[inline]
    pub fn service(&self) -> &str {
        &self.service
    }
}

impl FromStr for ServiceRef {
    type Err = ModelError;

    /// Splits on the first `/`; both halves must be non-empty after trimming.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (stack, service) = s
            .split_once('/')
            .ok_or_else(|| ModelError::InvalidServiceRef(s.to_string()))?;

        let (stack, service) = (stack.trim(), service.trim());
        if stack.is_empty() || service.is_empty() {
            return Err(ModelError::InvalidServiceRef(s.to_string()));
        }
        Ok(Self::new(stack, service))
    }
}

impl TryFrom<String> for ServiceRef {
    type Error = ModelError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ServiceRef> for String {
    fn from(r: ServiceRef) -> Self {
        r.to_string()
    }
}

impl fmt::Display for ServiceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.stack, self.service)
    }
}
