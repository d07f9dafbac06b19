//! Error taxonomy shared by the store and the domain service.
//!
//! Three conditions cover the whole core: invalid caller input, a dangling
//! entity reference, and a cancellation signal observed before a critical
//! section. The HTTP boundary maps them to status codes; nothing in the
//! core terminates the process on error.

use thiserror::Error;

/// Typed error returned by store and service operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller-supplied input violates a precondition. Recoverable by
    /// correcting the input; never retried automatically.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced entity ID does not exist in the store. `entity` names
    /// the failing reference ("contour", "ready parcel", ...).
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// The caller's cancellation signal fired before the operation entered
    /// its critical section. No mutation was performed.
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn not_found(entity: &'static str) -> Self {
        Error::NotFound { entity }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, Error>;
