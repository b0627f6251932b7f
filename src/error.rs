use serde_json::Value;
use thiserror::Error;

/// Errors returned by the library side of the adapter
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure before any response was received
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("Google Meet API returned {status}: {body}")]
    Api { status: u16, body: Value },

    #[error("OAuth error: {0}")]
    OAuth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Token storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status attached to the error, if the server produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_for_api_errors() {
        let err = Error::Api {
            status: 401,
            body: serde_json::json!({"error": "unauthenticated"}),
        };
        assert_eq!(err.status(), Some(401));
        assert!(err.is_unauthorized());

        let err = Error::OAuth("no refresh token".to_string());
        assert_eq!(err.status(), None);
        assert!(!err.is_unauthorized());
    }
}
