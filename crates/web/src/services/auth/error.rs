//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;

/// Errors that can occur during login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The backend failed or refused the request for another reason.
    #[error("backend error: {0}")]
    Api(#[from] ApiError),

    /// The session record could not be written.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AuthError {
    /// Map a failed `/users/login` call.
    pub(super) fn from_login(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => Self::InvalidCredentials,
            other => Self::Api(other),
        }
    }

    /// Text safe to show in a notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials => "Invalid email or password.".to_string(),
            Self::Api(err) => err.user_message(),
            Self::Session(_) => "Could not start your session. Please try again.".to_string(),
        }
    }
}
