//! Service health watching.
//!
//! - [`TaskRegistry`] validates and persists watch descriptors through a [`TaskStore`];
//! - [`HealthScheduler`] runs one cancellable polling loop per live watch;
//! - [`WatchService`] ties both together in the order callers must follow.
pub mod error;
pub use error::WatchError;

pub mod health;
pub use health::{HealthReport, check_once};

pub mod registry;
pub use registry::TaskRegistry;

pub mod scheduler;
pub use scheduler::{BATCH_INTERVAL, HealthScheduler, PER_TASK_INTERVAL, SweepReport};

pub mod service;
pub use service::{WatchService, WatchStatus};

pub mod sink;
pub use sink::TracingAlertSink;

pub mod store;
pub use store::{MemoryTaskStore, StoreError, TaskStore};
