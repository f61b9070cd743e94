//! Application error types shared by list sources and selector state.
use thiserror::Error;

/// Top-level application error type.
///
/// Selector state never lets these escape to the owning form; they surface
/// only from list sources, configuration validation and the binaries.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether retrying the same request could plausibly succeed.
    ///
    /// # Returns
    /// `true` for transport failures and server-side (5xx) statuses.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn retryable_covers_transport_and_server_errors_only() {
        assert!(AppError::Transport("reset".to_string()).is_retryable());
        assert!(AppError::Http {
            status: 503,
            message: "unavailable".to_string()
        }
        .is_retryable());
        assert!(!AppError::Http {
            status: 404,
            message: "missing".to_string()
        }
        .is_retryable());
        assert!(!AppError::BadRequest("empty resource".to_string()).is_retryable());
    }

    #[test]
    fn http_error_display_includes_status_and_message() {
        let err = AppError::Http {
            status: 400,
            message: "invalid filter".to_string(),
        };
        assert_eq!(err.to_string(), "Request failed (400): invalid filter");
    }
}
