//! Outbound alert seam.
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("alert destination rejected message: {0}")]
    Rejected(String),

    #[error("alert transport failed: {0}")]
    Transport(String),
}

/// Destination for canary announcements and health alerts.
///
/// Delivery is best-effort: callers log failures and move on.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn post(&self, channel: &str, text: &str) -> Result<(), AlertError>;
}
