mod endpoint;
pub use endpoint::Endpoint;

mod health;
pub use health::{Container, HEALTHY, HealthState, Resource};

mod service;
pub use service::ServiceRef;

mod task_id;
pub use task_id::TaskId;

mod weights;
pub use weights::{WEIGHT_TOTAL, Weights};

/// Destination identifier understood by the chat layer (channel or user ID).
pub type ChannelId = String;
