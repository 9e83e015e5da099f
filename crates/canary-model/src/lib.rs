mod domain;
pub use domain::{
    ChannelId, Container, Endpoint, HEALTHY, HealthState, Resource, ServiceRef, TaskId, WEIGHT_TOTAL,
    Weights,
};

mod error;
pub use error::{ModelError, ModelResult};

mod spec;
pub use spec::{WatchSpec, WatchTask};
