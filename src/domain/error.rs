//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent malformed input handed to the core.
///
/// Gestures never produce these; they only surface while loading a forest
/// or validating a configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("forest must be a JSON array of nodes, got {0}")]
    ForestNotArray(String),

    #[error("node at {path:?} must be a JSON object")]
    NodeNotObject { path: Vec<usize> },

    #[error("children of node at {path:?} must be a JSON array")]
    ChildrenNotArray { path: Vec<usize> },

    #[error("field name for {0} must not be empty")]
    EmptyFieldName(&'static str),

    #[error("delimiter must not be empty")]
    EmptyDelimiter,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
