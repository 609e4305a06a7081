//! Infrastructure-level errors (store access)

use std::path::PathBuf;

use thiserror::Error;

/// Failures of a category store. Surfaced unchanged through the service layer.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse catalog {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("cannot serialize catalog: {0}")]
    Serialize(String),

    #[error("catalog changed concurrently (loaded revision {expected}, found {found}); retry the operation")]
    Conflict { expected: u64, found: u64 },

    #[error("store lock poisoned by a panicked writer")]
    Poisoned,
}

impl StoreError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
