use canary_model::{TaskId, WatchSpec, WatchTask};
use tracing::{instrument, warn};

use crate::error::WatchResult;
use crate::registry::TaskRegistry;
use crate::scheduler::{HealthScheduler, SweepReport};

/// A persisted descriptor and whether a loop is live for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchStatus {
    pub task: WatchTask,
    pub running: bool,
}

/// Registry and scheduler combined in the order callers must respect:
/// persist before start, stop before remove.
pub struct WatchService {
    registry: TaskRegistry,
    scheduler: HealthScheduler,
}

impl WatchService {
    pub fn new(registry: TaskRegistry, scheduler: HealthScheduler) -> Self {
        Self { registry, scheduler }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &HealthScheduler {
        &self.scheduler
    }

    /// Persist a watch and start its loop.
    ///
    /// When the loop cannot start the descriptor is removed again.
    #[instrument(level = "debug", skip(self, spec), fields(service = %spec.service))]
    pub async fn watch(&self, spec: WatchSpec) -> WatchResult<TaskId> {
        spec.service_ref()?;
        let id = self.registry.add(spec.clone()).await?;
        if let Err(e) = self.scheduler.start(WatchTask::new(id, spec)) {
            if let Err(rm) = self.registry.remove(id).await {
                warn!(task = %id, error = %rm, "orphaned watch descriptor");
            }
            return Err(e);
        }
        Ok(id)
    }

    /// Stop the loop, then drop the descriptor.
    ///
    /// Returns `false` when neither a loop nor a descriptor existed.
    #[instrument(level = "debug", skip(self))]
    pub async fn unwatch(&self, id: TaskId) -> WatchResult<bool> {
        let stopped = self.scheduler.stop(id);
        let removed = self.registry.remove(id).await?;
        Ok(stopped || removed)
    }

    pub async fn list(&self) -> WatchResult<Vec<WatchStatus>> {
        Ok(self
            .registry
            .list()
            .await?
            .into_iter()
            .map(|task| WatchStatus {
                running: self.scheduler.is_running(task.id),
                task,
            })
            .collect())
    }

    /// Run one sweep over every persisted descriptor.
    pub async fn sweep(&self) -> WatchResult<SweepReport> {
        let tasks = self.registry.list().await?;
        Ok(self.scheduler.sweep(&tasks).await)
    }

    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
    }
}
