use thiserror::Error;

use crate::alert::AlertError;
use crate::config::Tag;
use crate::gateway::GatewayError;

/// Coarse error category for callers that only branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input or config content rejected, nothing was stored.
    Validation,
    /// Load balancer or its config is missing.
    NotFound,
    /// Orchestration API, store or alert destination failed.
    Upstream,
    /// A watched service name matched no stack or service.
    Resolution,
}

#[derive(Debug, Error)]
pub enum CanaryError {
    #[error("no load balancer config found for '{lb}'")]
    ConfigNotFound { lb: String },

    #[error("weights must each be within 0..=100 and sum to 100, got new={new} old={old}")]
    InvalidWeightSum { new: i32, old: i32 },

    #[error("load balancer config body is empty")]
    EmptyConfig,

    #[error("expected one `new` and one `old` weighted server line, found {found} weighted line(s)")]
    MissingWeightedLines { found: usize },

    #[error("more than one weighted server line tagged `{tag}`")]
    DuplicateTag { tag: Tag },

    #[error("orchestration api unavailable: {0}")]
    UpstreamUnavailable(#[from] GatewayError),

    #[error("announcement failed: {0}")]
    Alert(#[from] AlertError),
}

impl CanaryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CanaryError::ConfigNotFound { .. } => ErrorKind::NotFound,
            CanaryError::InvalidWeightSum { .. }
            | CanaryError::EmptyConfig
            | CanaryError::MissingWeightedLines { .. }
            | CanaryError::DuplicateTag { .. } => ErrorKind::Validation,
            CanaryError::UpstreamUnavailable(_) | CanaryError::Alert(_) => ErrorKind::Upstream,
        }
    }

    /// Message suitable for a chat operator, naming the likely cause.
    pub fn hint(&self) -> &'static str {
        match self {
            CanaryError::ConfigNotFound { .. } => "No haproxy.cfg found, check if the ID param is right",
            CanaryError::InvalidWeightSum { .. } => "Weights must be between 0 and 100 and sum 100",
            CanaryError::EmptyConfig => "The body of haproxy.cfg is empty",
            CanaryError::MissingWeightedLines { .. } => {
                "haproxy.cfg needs one `new` and one `old` server line with a weight"
            }
            CanaryError::DuplicateTag { .. } => "haproxy.cfg has more than one server line with the same `new`/`old` tag",
            CanaryError::UpstreamUnavailable(_) => "Orchestration API unreachable, try the command again",
            CanaryError::Alert(_) => "Canary was updated but the announcement could not be posted",
        }
    }
}

pub type CanaryResult<T> = Result<T, CanaryError>;
