//! Error types for the admin runtime.

use thiserror::Error;

use crate::error::ClientError;

/// Result type for admin operations.
pub type AdminResult<T> = Result<T, AdminError>;

/// Errors raised by [`AdminStore`](super::AdminStore).
#[derive(Error, Debug)]
pub enum AdminError {
    /// Input rejected before any request was made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Another role already uses this name (case-insensitive).
    #[error("Role name already exists: {0}")]
    DuplicateRole(String),

    /// System roles cannot be modified.
    #[error("System role cannot be modified: {0}")]
    SystemRole(String),

    /// Backend or transport failure.
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl AdminError {
    /// Best-effort message suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            AdminError::Client(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
