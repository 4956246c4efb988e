//! Authentication against a hosted identity service.
//!
//! Nothing in the article browser depends on auth. The TUI receives an
//! [`AuthContext`] at construction and reads the signed-in user from it; the
//! CLI uses it for `login` / `logout` and [`IdentityClient`] for `signup`.

mod client;
mod context;
mod session;

pub use client::{IdentityClient, SIGN_UP_SUCCESS_MESSAGE};
pub use context::{AuthContext, AuthPhase, PendingRevoke};
pub use session::{Session, SessionStore, User};

use crate::api::ApiError;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// The identity service rejected the request.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Invalid identity response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Session storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Identity response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("No identity service configured")]
    NotConfigured,
    #[error("Identity service URL cannot be used as a base")]
    InvalidUrl,
    #[error("Auth context is not active ({0:?})")]
    InvalidPhase(AuthPhase),
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, message } => AuthError::Rejected { status, message },
            ApiError::Network(e) => AuthError::Network(e),
            ApiError::Decode(e) => AuthError::Decode(e),
            ApiError::ResponseTooLarge(limit) => AuthError::ResponseTooLarge(limit),
            ApiError::InvalidUrl(_) => AuthError::InvalidUrl,
        }
    }
}

impl AuthError {
    /// Pull the most specific message the service sent
    /// (`error_description`, then `msg`, then `message`).
    fn from_response_body(status: u16, body: &[u8]) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            error_description: Option<String>,
            msg: Option<String>,
            message: Option<String>,
        }

        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error_description.or(b.msg).or(b.message))
            .unwrap_or_else(|| format!("Identity service returned HTTP {status}"));

        AuthError::Rejected { status, message }
    }
}
