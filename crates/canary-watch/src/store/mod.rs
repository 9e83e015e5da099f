//! Durable storage seam for watch descriptors.
mod memory;
pub use memory::MemoryTaskStore;

use async_trait::async_trait;
use canary_model::{TaskId, WatchSpec, WatchTask};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Create/list/delete over persisted watch descriptors.
///
/// Identities are assigned by the store on creation. Concurrent calls rely on
/// the store's own locking.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, spec: WatchSpec) -> Result<TaskId, StoreError>;
    async fn list(&self) -> Result<Vec<WatchTask>, StoreError>;
    /// Returns `false` when no descriptor had that id.
    async fn delete(&self, id: TaskId) -> Result<bool, StoreError>;
}
