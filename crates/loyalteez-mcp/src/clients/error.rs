//! Errors raised by the Loyalteez API clients.

use thiserror::Error;

/// Loyalteez client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connection, timeout, body transfer).
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// A success response that does not match its schema.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// The endpoint is not available on this deployment. The guidance names
    /// the verified calls that reconstruct the answer.
    #[error("{guidance}")]
    Unsupported {
        /// Manual reconstruction steps.
        guidance: String,
    },
}

impl ClientError {
    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the remote side reported the endpoint as absent.
    pub fn is_endpoint_missing(&self) -> bool {
        matches!(self.status(), Some(404) | Some(405) | Some(501))
    }

    /// Whether this is an unavailable-endpoint error rather than a failed call.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ClientError::Unsupported { .. })
    }
}

/// Result alias for client calls.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_shows_remote_message() {
        let err = ClientError::Api {
            status: 429,
            message: "Rate limit exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "Rate limit exceeded");
        assert_eq!(err.status(), Some(429));
        assert!(!err.is_endpoint_missing());
    }

    #[test]
    fn test_endpoint_missing() {
        let err = ClientError::Api {
            status: 404,
            message: "HTTP 404: Not Found".to_string(),
        };
        assert!(err.is_endpoint_missing());
        assert!(!err.is_unsupported());

        let unsupported = ClientError::Unsupported {
            guidance: "Use another endpoint".to_string(),
        };
        assert!(unsupported.is_unsupported());
        assert_eq!(unsupported.to_string(), "Use another endpoint");
    }
}
