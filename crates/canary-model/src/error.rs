use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid service reference '{0}' (expected stackName/serviceName)")]
    InvalidServiceRef(String),

    #[error("weights must be within 0..=100 and sum to 100, got new={new} old={old}")]
    InvalidWeightSum { new: i32, old: i32 },

    #[error("invalid task id: {0}")]
    InvalidTaskId(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
