use canary_core::{ErrorKind, GatewayError};
use canary_model::{ModelError, TaskId};
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("invalid watch: {0}")]
    Validation(#[from] ModelError),

    #[error("cannot resolve '{target}': {reason}")]
    Resolution { target: String, reason: String },

    #[error("orchestration api unavailable: {0}")]
    Upstream(#[from] GatewayError),

    #[error("task store failed: {0}")]
    Store(#[from] StoreError),

    #[error("watch {0} is already running")]
    AlreadyRunning(TaskId),

    #[error("health scheduler is shut down")]
    ShutDown,
}

impl WatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WatchError::Validation(_) | WatchError::AlreadyRunning(_) | WatchError::ShutDown => {
                ErrorKind::Validation
            }
            WatchError::Resolution { .. } => ErrorKind::Resolution,
            WatchError::Upstream(_) | WatchError::Store(_) => ErrorKind::Upstream,
        }
    }
}

pub type WatchResult<T> = Result<T, WatchError>;
