//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::application::rig::Stage;
use crate::domain::DomainError;

/// Application errors wrap domain errors and add rig and service context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("rig '{rig_type}' on bone '{bone}' failed in {stage}: {source}")]
    Rig {
        bone: String,
        rig_type: String,
        stage: Stage,
        #[source]
        source: DomainError,
    },

    #[error("unknown rig type '{rig_type}' on bone '{bone}'")]
    UnknownRigType { bone: String, rig_type: String },

    #[error("invalid rig parameters on bone '{bone}': {source}")]
    InvalidParams {
        bone: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid metarig: {message}")]
    InvalidMetarig { message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
