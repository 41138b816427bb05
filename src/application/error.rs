//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{DomainError, MindMapId};

/// Application errors wrap domain errors and add use-case context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("mind map not found: {0}")]
    MindMapNotFound(MindMapId),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// True for errors caused by the caller's input rather than the environment.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ApplicationError::Domain(_)
                | ApplicationError::MindMapNotFound(_)
                | ApplicationError::UnsupportedFormat(_)
        )
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
