use serde::Deserialize;
use thiserror::Error;

/// Message used when a failed response carries no readable body.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";
/// Message used when a failed response is JSON but has no `message` field.
pub const REQUEST_FAILED_MESSAGE: &str = "Request failed";

/// HTTP status the backend uses to signal a refresh cooldown.
pub const STATUS_TOO_MANY_REQUESTS: u16 = 429;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response, normalized to status plus server message.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Build the structured failure for a non-success response body.
    ///
    /// - JSON with a `message` string → that message
    /// - JSON without one → [`REQUEST_FAILED_MESSAGE`]
    /// - empty or non-JSON body → [`UNKNOWN_ERROR_MESSAGE`]
    pub fn from_response_body(status: u16, body: &[u8]) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            message: Option<String>,
        }

        let message = match serde_json::from_slice::<ErrorBody>(body) {
            Ok(ErrorBody { message: Some(m) }) if !m.is_empty() => m,
            Ok(_) => REQUEST_FAILED_MESSAGE.to_string(),
            Err(_) => UNKNOWN_ERROR_MESSAGE.to_string(),
        };

        ApiError::Status { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server's message when this failure is a 429, otherwise `None`.
    ///
    /// This is the only status-specific branch callers make.
    pub fn rate_limit_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { status, message } if *status == STATUS_TOO_MANY_REQUESTS => {
                Some(message)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_of(err: &ApiError) -> &str {
        match err {
            ApiError::Status { message, .. } => message,
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[test]
    fn server_message_is_kept() {
        let err = ApiError::from_response_body(429, br#"{"message":"Please wait 30 minutes"}"#);
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.rate_limit_message(), Some("Please wait 30 minutes"));
    }

    #[test]
    fn json_without_message_falls_back() {
        let err = ApiError::from_response_body(500, br#"{"error":"boom"}"#);
        assert_eq!(message_of(&err), REQUEST_FAILED_MESSAGE);
    }

    #[test]
    fn empty_body_falls_back_to_unknown() {
        let err = ApiError::from_response_body(502, b"");
        assert_eq!(message_of(&err), UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn html_body_falls_back_to_unknown() {
        let err = ApiError::from_response_body(500, b"<html>Internal Server Error</html>");
        assert_eq!(message_of(&err), UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn only_429_is_rate_limited() {
        let err = ApiError::from_response_body(503, br#"{"message":"down"}"#);
        assert!(err.rate_limit_message().is_none());
        assert_eq!(message_of(&err), "down");
    }
}
