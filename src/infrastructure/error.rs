//! Infrastructure-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;

/// Infrastructure errors wrap application errors raised by wired services.
///
/// Filesystem failures reach this layer already carrying their path context
/// as [`ApplicationError::OperationFailed`].
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),
}
