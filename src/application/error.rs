// src/application/error.rs
use crate::domain::errors::DomainError;
use thiserror::Error;

pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("infrastructure failure: {0}")]
    Infrastructure(String),
}

/// Caller-facing classification of any [`ApplicationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Show "not found"; do not retry.
    NotFound,
    /// Surface to the user for correction.
    Validation,
    /// Slug (or other uniqueness) collision; offer an adjustment.
    ConstraintConflict,
    /// Transient storage failure; retry policy belongs to the caller.
    StorageUnavailable,
    Internal,
}

impl ApplicationError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn infrastructure(msg: impl Into<String>) -> Self {
        Self::Infrastructure(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Domain(DomainError::Validation(_)) => ErrorKind::Validation,
            Self::NotFound(_) | Self::Domain(DomainError::NotFound(_)) => ErrorKind::NotFound,
            Self::Conflict(_) | Self::Domain(DomainError::Conflict(_)) => {
                ErrorKind::ConstraintConflict
            }
            Self::Domain(DomainError::Unavailable(_)) => ErrorKind::StorageUnavailable,
            Self::Infrastructure(_) | Self::Domain(DomainError::Persistence(_)) => {
                ErrorKind::Internal
            }
        }
    }
}
