//! Application-level errors (wraps domain and store errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::StoreError;

/// Application errors: a violated tree invariant, a store failure, or bad settings.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("config error: {message}")]
    Config { message: String },
}

impl ApplicationError {
    /// HTTP status a transport layer should answer with.
    ///
    /// Bad input and rejected relationships are 400, unknown ids 404,
    /// state conflicts 409, corrupt data and store failures 500.
    pub fn http_status(&self) -> u16 {
        match self {
            ApplicationError::Domain(e) => match e {
                DomainError::InvalidField { .. }
                | DomainError::DuplicateName(_)
                | DomainError::ParentNotFound(_)
                | DomainError::SelfParent(_)
                | DomainError::Cycle { .. } => 400,
                DomainError::NotFound(_) => 404,
                DomainError::HasChildren { .. } => 409,
                DomainError::CycleDetected(..) => 500,
            },
            ApplicationError::Store(StoreError::Conflict { .. }) => 409,
            ApplicationError::Store(_) | ApplicationError::Config { .. } => 500,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
