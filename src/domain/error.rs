//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent business rule violations on the mind-map model.
/// Messages are shown to users verbatim, so they name the specific reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("malformed mind map data: {0}")]
    Malformed(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Entity named in a [`DomainError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    MindMap,
    Node,
    Edge,
    Handle,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::MindMap => "mind map",
            EntityKind::Node => "node",
            EntityKind::Edge => "edge",
            EntityKind::Handle => "handle",
        };
        f.write_str(name)
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
