//! Domain-level errors (no external dependencies)

use thiserror::Error;

use super::entities::CategoryId;

/// Domain errors represent violated tree invariants.
/// Every variant names the rule that was broken so callers can fix the input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("category name already exists: {0}")]
    DuplicateName(String),

    #[error("parent category not found: {0}")]
    ParentNotFound(CategoryId),

    #[error("category not found: {0}")]
    NotFound(String),

    #[error("category cannot be its own parent: {0}")]
    SelfParent(CategoryId),

    #[error("moving {category} under {new_parent} would create a cycle: the new parent is a descendant")]
    Cycle {
        category: CategoryId,
        new_parent: CategoryId,
    },

    #[error("cycle detected in stored hierarchy at {0} (ancestor chain exceeds {1} levels)")]
    CycleDetected(CategoryId, usize),

    #[error("category has {count} child categories and cannot be deleted: {id}")]
    HasChildren { id: CategoryId, count: usize },
}

impl DomainError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    pub fn not_found(id: CategoryId) -> Self {
        Self::NotFound(id.to_string())
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
