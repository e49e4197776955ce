//! Error handling for the client runtime.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the backend or touching client storage.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP transport failure (connection refused, reset, decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No bearer token available, or the backend rejected it.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found on the backend.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-2xx response that is not covered by a more specific variant.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A request URL could not be built (bad base URL or unusable id).
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Client storage failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Whether the backend reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }

    /// Whether the request never produced an HTTP response.
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Http(e) if e.status().is_none())
    }

    /// Best-effort message suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Unauthorized(msg)
            | ClientError::NotFound(msg)
            | ClientError::Api { message: msg, .. }
                if !msg.is_empty() =>
            {
                msg.clone()
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::NotFound("job-123".to_string());
        assert_eq!(err.to_string(), "Not found: job-123");

        let err = ClientError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error (500): boom");
    }

    #[test]
    fn test_user_message_prefers_detail() {
        let err = ClientError::Api {
            status: 422,
            message: "schema is locked".to_string(),
        };
        assert_eq!(err.user_message(), "schema is locked");

        let err = ClientError::Api {
            status: 502,
            message: String::new(),
        };
        assert_eq!(err.user_message(), "API error (502): ");
    }

    #[test]
    fn test_not_found_predicate() {
        assert!(ClientError::NotFound("x".into()).is_not_found());
        assert!(!ClientError::Storage("x".into()).is_not_found());
        assert!(!ClientError::Storage("x".into()).is_network());
    }
}
