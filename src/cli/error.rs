//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::StoreError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => exitcode::USAGE,
            CliError::Application(e) => match e {
                ApplicationError::Domain(d) => match d {
                    DomainError::NotFound(_) => exitcode::NOINPUT,
                    DomainError::CycleDetected(..) => exitcode::SOFTWARE,
                    DomainError::HasChildren { .. } => exitcode::CANTCREAT,
                    _ => exitcode::DATAERR,
                },
                ApplicationError::Store(s) => match s {
                    StoreError::Io { .. } => exitcode::IOERR,
                    StoreError::Parse { .. } => exitcode::DATAERR,
                    StoreError::Conflict { .. } => exitcode::TEMPFAIL,
                    StoreError::Serialize(_) | StoreError::Poisoned => exitcode::SOFTWARE,
                },
                ApplicationError::Config { .. } => exitcode::CONFIG,
            },
        }
    }
}
