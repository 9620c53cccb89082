//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::Infra(InfraError::Application(app)) => match app {
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::InvalidMetarig { .. }
                | ApplicationError::InvalidParams { .. }
                | ApplicationError::UnknownRigType { .. } => crate::exitcode::DATAERR,
                ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                ApplicationError::Domain(_) | ApplicationError::Rig { .. } => {
                    crate::exitcode::SOFTWARE
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_unknown_rig_type_when_mapping_then_data_error() {
        let err: CliError = ApplicationError::UnknownRigType {
            bone: "ORG-a".into(),
            rig_type: "limbs.arm".into(),
        }
        .into();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_unwritable_metarig_path_when_saving_then_io_error_code() {
        use std::sync::Arc;

        use crate::application::services::MetarigService;
        use crate::infrastructure::traits::RealFileSystem;

        let temp = tempfile::TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let svc = MetarigService::new(Arc::new(RealFileSystem));
        let armature = svc.sample().unwrap();

        let err: CliError = svc
            .save(&armature, &blocker.join("rig.json"))
            .unwrap_err()
            .into();

        assert_eq!(err.exit_code(), crate::exitcode::IOERR);
        assert!(err.to_string().contains("blocker"));
    }

    #[test]
    fn given_config_error_when_mapping_then_config_code() {
        let err: CliError = ApplicationError::Config {
            message: "bad".into(),
        }
        .into();
        assert_eq!(err.exit_code(), crate::exitcode::CONFIG);
    }
}
