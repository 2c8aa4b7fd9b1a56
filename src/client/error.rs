use thiserror::Error;

/// Errors returned by the admin API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server responded with a non-success status code.
    #[error("API error ({status}): {message}")]
    Http { status: u16, message: String },

    /// The request failed at the transport level.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// A URL could not be constructed from the configured server address.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The client has no access token; `login` has not succeeded yet.
    #[error("not authenticated")]
    NotAuthenticated,
}

impl ApiError {
    /// HTTP status code, if this error carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the server rejected the request because the resource
    /// already exists.
    pub fn is_conflict(&self) -> bool {
        self.status_code() == Some(409)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code() {
        let err = ApiError::Http {
            status: 404,
            message: "Realm not found".to_string(),
        };
        assert_eq!(err.status_code(), Some(404));
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_conflict() {
        let err = ApiError::Http {
            status: 409,
            message: "Group already exists".to_string(),
        };
        assert!(err.is_conflict());
    }
}
