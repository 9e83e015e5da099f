//! Canary traffic-weight control for text-configured load balancers.
//!
//! - [`config`] turns a config body into lines and weighted server lines;
//! - [`mutator`] holds the pure enable/disable/reweight transforms;
//! - [`controller`] sequences gateway fetch, mutation and store.
pub mod alert;
pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod mutator;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use alert::{AlertError, AlertSink};
pub use config::{COMMENT_MARKER, CommentState, ConfigText, Tag, WeightedServerLine};
pub use controller::{CanaryController, CanaryInfo, CanaryUpdate};
pub use error::{CanaryError, CanaryResult, ErrorKind};
pub use gateway::{Gateway, GatewayError, GatewayResult, LbEnvelope, ServiceAction};
pub use metrics::{MetricsBackend, MetricsHandle, MutationOutcome, NoOpMetrics, TickOutcome, noop_metrics};

pub mod prelude {
    pub use crate::alert::AlertSink;
    pub use crate::controller::CanaryController;
    pub use crate::error::CanaryError;
    pub use crate::gateway::Gateway;
}
