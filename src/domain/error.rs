//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent armature and naming rule violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("bone not found: {0}")]
    BoneNotFound(String),

    #[error("duplicate bone name: {0}")]
    DuplicateBone(String),

    #[error("invalid bone name: {0:?}")]
    InvalidName(String),

    #[error("parent '{parent}' of bone '{bone}' does not exist")]
    MissingParent { bone: String, parent: String },

    #[error("cycle detected in hierarchy at bone: {0}")]
    CycleDetected(String),

    #[error("cannot parent '{child}' to '{parent}': would create a cycle")]
    ParentCycle { child: String, parent: String },

    #[error("unknown widget type: {0}")]
    UnknownWidget(String),

    #[error("cannot relink '{spec}' from '{bone}': {reason}")]
    RelinkTarget {
        spec: String,
        bone: String,
        reason: String,
    },

    #[error("constraint '{constraint}' on bone '{bone}': {message}")]
    InvalidConstraint {
        bone: String,
        constraint: String,
        message: String,
    },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
