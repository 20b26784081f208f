//! Error types for the back-office SDK

use mp_common::GENERIC_ERROR_MESSAGE;
use thiserror::Error;

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The session could not be recovered (refresh failed or no refresh
    /// token). The session has already been cleared; sign in again.
    #[error("Session expired, please sign in again")]
    SessionExpired,

    /// 401 on a request that was already replayed after a refresh
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 403
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// 400 / 422
    #[error("Validation error: {0}")]
    Validation(String),

    /// 409, typically a duplicate idempotency key with a different payload
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 429
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// 5xx
    #[error("Server error: {0}")]
    Server(String),

    /// Any other non-success status
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport failure (DNS, connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response decoded but not into the documented shape
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map a non-success, non-401 status and the server's message.
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            401 => Error::Unauthorized(message),
            403 => Error::Forbidden(message),
            404 => Error::NotFound(message),
            400 | 422 => Error::Validation(message),
            409 => Error::Conflict(message),
            429 => Error::RateLimited(message),
            500..=599 => Error::Server(message),
            code => Error::Api {
                status: code,
                message,
            },
        }
    }

    /// Text shown to the admin for this error.
    ///
    /// Server-reported failures surface the server's message verbatim;
    /// transport and decoding failures get the generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthorized(m)
            | Error::Forbidden(m)
            | Error::NotFound(m)
            | Error::Validation(m)
            | Error::Conflict(m)
            | Error::RateLimited(m)
            | Error::Server(m)
            | Error::Api { message: m, .. } => m.clone(),
            Error::SessionExpired => self.to_string(),
            Error::Http(_)
            | Error::Json(_)
            | Error::UnexpectedShape(_)
            | Error::Config(_)
            | Error::Other(_) => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }

    /// True for errors that end the session rather than the request.
    pub fn is_session_terminal(&self) -> bool {
        matches!(self, Error::SessionExpired)
    }

    /// HTTP status, when the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Unauthorized(_) => Some(401),
            Error::Forbidden(_) => Some(403),
            Error::NotFound(_) => Some(404),
            Error::Conflict(_) => Some(409),
            Error::RateLimited(_) => Some(429),
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            Error::from_status(StatusCode::UNPROCESSABLE_ENTITY, "bad".into()),
            Error::Validation(_)
        ));
        assert!(matches!(
            Error::from_status(StatusCode::CONFLICT, "dup".into()),
            Error::Conflict(_)
        ));
        assert!(matches!(
            Error::from_status(StatusCode::BAD_GATEWAY, "down".into()),
            Error::Server(_)
        ));
        let err = Error::from_status(StatusCode::IM_A_TEAPOT, "tea".into());
        assert_eq!(err.status(), Some(418));
    }

    #[test]
    fn test_user_message_is_verbatim() {
        let err = Error::from_status(StatusCode::BAD_REQUEST, "Insufficient balance".into());
        assert_eq!(err.user_message(), "Insufficient balance");
        assert_eq!(
            Error::UnexpectedShape("loans".into()).user_message(),
            GENERIC_ERROR_MESSAGE
        );
        assert!(Error::SessionExpired.is_session_terminal());
    }
}
