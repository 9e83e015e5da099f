use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use canary_model::{TaskId, WatchSpec, WatchTask};

use super::{StoreError, TaskStore};

/// Process-local [`TaskStore`]; descriptors are lost on restart.
#[derive(Debug)]
pub struct MemoryTaskStore {
    tasks: RwLock<BTreeMap<TaskId, WatchSpec>>,
    seq: AtomicU64,
}

impl Default for MemoryTaskStore {
    fn default() -> Self {
        Self {
            tasks: RwLock::new(BTreeMap::new()),
            seq: AtomicU64::new(1),
        }
    }
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn create(&self, spec: WatchSpec) -> Result<TaskId, StoreError> {
        let id = TaskId::new(self.seq.fetch_add(1, Ordering::Relaxed));
        self.tasks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, spec);
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<WatchTask>, StoreError> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tasks
            .iter()
            .map(|(id, spec)| WatchTask::new(*id, spec.clone()))
            .collect())
    }

    async fn delete(&self, id: TaskId) -> Result<bool, StoreError> {
        Ok(self
            .tasks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some())
    }
}
