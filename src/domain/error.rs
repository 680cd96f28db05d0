//! Domain-level errors (no external dependencies)

use std::path::PathBuf;
use thiserror::Error;

/// Domain errors represent structural violations of the hierarchy.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("source not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("malformed source {origin}: {message}")]
    MalformedSource { origin: String, message: String },

    #[error("duplicate id '{id}': {first} and {second}")]
    DuplicateId {
        id: String,
        first: String,
        second: String,
    },

    #[error("source yielded no entries")]
    EmptySource,

    #[error("node '{id}' is detached: parent chain did not reach root within {max_depth} hops")]
    DetachedNode { id: String, max_depth: usize },

    #[error("unknown node id: {0}")]
    UnknownNode(String),
}

impl DomainError {
    pub fn malformed(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedSource {
            origin: origin.into(),
            message: message.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
