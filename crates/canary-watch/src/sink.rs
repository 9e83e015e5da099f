use async_trait::async_trait;
use canary_core::{AlertError, AlertSink};
use tracing::info;

/// Alert sink that writes alerts to the log.
///
/// Used when no chat integration is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAlertSink;

#[async_trait]
impl AlertSink for TracingAlertSink {
    async fn post(&self, channel: &str, text: &str) -> Result<(), AlertError> {
        info!(target: "canary::alert", %channel, %text, "alert");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_accepts() {
        assert!(TracingAlertSink.post("ops", "hello").await.is_ok());
    }
}
