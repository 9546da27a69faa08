use thiserror::Error;

/// Broad classification of a [`GhostError`].
///
/// The tool shim flattens every error to its message, so the kind only
/// matters to callers inside the crate and to tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input: unsupported method, unparsable URL, invalid header or payload
    Validation,
    /// Staff API key could not be parsed or the token could not be signed
    Auth,
    /// Network, file or external process failure
    Transport,
    /// Non-2xx status or a response body that is not a JSON object
    Api,
}

/// Main error type for Admin API operations
#[derive(Debug, Error)]
pub enum GhostError {
    /// HTTP method outside GET/POST/PUT/DELETE
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    /// Staff API key is not of the form `<id>:<secret>`
    #[error("malformed key pair: expected '<id>:<secret>'")]
    MalformedKeyPair,

    /// Secret half of the staff API key is not hexadecimal
    #[error("invalid secret encoding: secret must be hexadecimal")]
    InvalidSecret(#[source] hex::FromHexError),

    /// Token signing failure
    #[error("failed to sign admin token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// Request building error
    #[error("failed to build request: {0}")]
    RequestBuild(String),

    /// Remote API answered with a status outside [200, 300)
    #[error("HTTP error: status {status}, body {body}")]
    Http { status: u16, body: String },

    /// 2xx response whose body is not a JSON object
    #[error("malformed response body: {0}")]
    MalformedBody(#[source] serde_json::Error),

    /// External upload command could not run or exited with failure
    #[error("external command failed: {0}")]
    Command(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Base64 decoding error
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GhostError {
    /// Create a new HTTP status error
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        GhostError::Http {
            status,
            body: body.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GhostError::UnsupportedMethod(_)
            | GhostError::RequestBuild(_)
            | GhostError::Json(_)
            | GhostError::UrlParse(_)
            | GhostError::Base64Decode(_) => ErrorKind::Validation,
            GhostError::MalformedKeyPair
            | GhostError::InvalidSecret(_)
            | GhostError::Signing(_) => ErrorKind::Auth,
            GhostError::Command(_) | GhostError::Reqwest(_) | GhostError::Io(_) => {
                ErrorKind::Transport
            }
            GhostError::Http { .. } | GhostError::MalformedBody(_) => ErrorKind::Api,
        }
    }

    /// Get the HTTP status code if the remote API rejected the request
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GhostError::Http { status, .. } => Some(*status),
            GhostError::Reqwest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error is an authentication rejection (401/403)
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status_code(), Some(401) | Some(403))
    }
}

/// Result type for Admin API operations
pub type Result<T> = std::result::Result<T, GhostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_message() {
        let error = GhostError::http(422, r#"{"errors":[{"message":"bad image"}]}"#);
        assert_eq!(
            error.to_string(),
            r#"HTTP error: status 422, body {"errors":[{"message":"bad image"}]}"#
        );
        assert_eq!(error.kind(), ErrorKind::Api);
        assert_eq!(error.status_code(), Some(422));
    }

    #[test]
    fn test_error_unauthorized() {
        assert!(GhostError::http(401, "").is_unauthorized());
        assert!(GhostError::http(403, "").is_unauthorized());
        assert!(!GhostError::http(404, "").is_unauthorized());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            GhostError::UnsupportedMethod("PATCH".to_string()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(GhostError::MalformedKeyPair.kind(), ErrorKind::Auth);
        assert_eq!(
            GhostError::Command("exit status: 7".to_string()).kind(),
            ErrorKind::Transport
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(GhostError::from(io).kind(), ErrorKind::Transport);
        assert_eq!(GhostError::MalformedKeyPair.status_code(), None);
    }
}
