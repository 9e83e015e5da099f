use std::sync::Arc;

use canary_model::{TaskId, WatchSpec, WatchTask};
use tracing::{debug, info};

use crate::error::WatchResult;
use crate::store::TaskStore;

/// CRUD over watch descriptors with validation before persistence.
///
/// Removing a descriptor does not stop a running loop: callers stop the
/// scheduler handle first (see [`crate::WatchService::unwatch`]).
#[derive(Clone)]
pub struct TaskRegistry {
    store: Arc<dyn TaskStore>,
}

impl TaskRegistry {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Validate and persist a descriptor.
    ///
    /// Identical targets are not deduplicated; each call yields a new task.
    pub async fn add(&self, spec: WatchSpec) -> WatchResult<TaskId> {
        spec.validate()?;
        let service = spec.service.clone();
        let id = self.store.create(spec).await?;
        info!(task = %id, %service, "watch descriptor stored");
        Ok(id)
    }

    /// Every persisted descriptor, running or not.
    pub async fn list(&self) -> WatchResult<Vec<WatchTask>> {
        Ok(self.store.list().await?)
    }

    pub async fn remove(&self, id: TaskId) -> WatchResult<bool> {
        let removed = self.store.delete(id).await?;
        debug!(task = %id, removed, "watch descriptor removed");
        Ok(removed)
    }
}
