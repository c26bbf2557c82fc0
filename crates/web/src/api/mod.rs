//! REST client for the logistics backend.
//!
//! # Architecture
//!
//! - One `reqwest` client shared by every handler (cheap to clone)
//! - The backend is the source of truth; nothing is synced locally
//! - Every authenticated call sends `Authorization: Bearer <token>`
//! - No retries; failures are classified into [`ApiError`]
//!
//! # Endpoints
//!
//! Calls are grouped by resource, one module each:
//!
//! - `users` - register, login, profile
//! - `stocks` - inventory CRUD (multipart create/update)
//! - `orders` - placing, listing and progressing orders
//! - `drivers` - driver listing for assignment
//! - `admin` - user management and system-wide listings
//! - `feedback` - client feedback submission
//!
//! # Example
//!
//! ```rust,ignore
//! use ldms_web::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api)?;
//! let login = client.login(&credentials).await?;
//! let stocks = client.list_stocks(&login.token).await?;
//! ```

mod admin;
mod drivers;
mod feedback;
mod orders;
mod stocks;
pub mod types;
mod users;

pub use types::*;

use std::sync::Arc;

use ldms_core::AuthToken;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ApiConfig;

/// Longest slice of a response body copied into logs or error messages.
const BODY_EXCERPT_CHARS: usize = 500;

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never got a response (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend rejected the bearer token (401 or 403).
    #[error("Unauthorized")]
    Unauthorized,

    /// The backend refused the request, usually a validation failure.
    #[error("Rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The backend failed while handling the request.
    #[error("Backend error ({status})")]
    Server { status: u16 },

    /// The response body did not have the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether the backend considers the session gone.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Text safe to show in a notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => "The logistics service is unreachable. Please try again.".to_string(),
            Self::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            Self::Rejected { message, .. } => message.clone(),
            Self::Server { .. } => "The logistics service could not complete the request.".to_string(),
            Self::Parse(_) => "The logistics service sent an unexpected response.".to_string(),
        }
    }

    /// Classify a non-success response.
    fn from_response(status: StatusCode, body: &str) -> Self {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Self::Unauthorized
        } else if status.is_client_error() {
            Self::Rejected {
                status: status.as_u16(),
                message: rejection_message(body),
            }
        } else {
            Self::Server {
                status: status.as_u16(),
            }
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// The backend answers with `{"message": ...}` or `{"error": ...}`; anything
/// else falls back to the raw text.
fn rejection_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
    }

    if let Ok(ErrorBody { message, error }) = serde_json::from_str::<ErrorBody>(body)
        && let Some(text) = message.or(error).filter(|t| !t.trim().is_empty())
    {
        return text;
    }

    let text = excerpt(body.trim());
    if text.is_empty() {
        "The request was rejected.".to_string()
    } else {
        text
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

/// List responses arrive either bare or wrapped in `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListEnvelope<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> ListEnvelope<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Wrapped { data: items } => items,
        }
    }
}

/// Client for the logistics REST backend.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("ldms-web/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Full URL for a backend path such as `/users/me`.
    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Start a request, attaching the bearer token when given.
    fn request(&self, method: Method, path: &str, token: Option<&AuthToken>) -> RequestBuilder {
        let request = self.inner.client.request(method, self.endpoint(path));
        match token {
            Some(token) => request.bearer_auth(token.expose()),
            None => request,
        }
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            let error = ApiError::from_response(status, &response_text);
            if matches!(error, ApiError::Server { .. }) {
                tracing::error!(
                    status = %status,
                    body = %excerpt(&response_text),
                    "Backend returned server error"
                );
            } else {
                tracing::warn!(status = %status, error = %error, "Backend rejected request");
            }
            return Err(error);
        }

        Ok(response_text)
    }

    /// Send a request and parse the JSON response.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response_text = self.send(request).await?;

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %excerpt(&response_text),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request whose response is a list, bare or wrapped.
    async fn execute_list<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Vec<T>, ApiError> {
        self.execute::<ListEnvelope<T>>(request)
            .await
            .map(ListEnvelope::into_vec)
    }

    /// Send a request whose response body is not needed.
    async fn execute_unit(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_auth_failures() {
        assert!(ApiError::from_response(StatusCode::UNAUTHORIZED, "").is_unauthorized());
        assert!(ApiError::from_response(StatusCode::FORBIDDEN, "").is_unauthorized());
    }

    #[test]
    fn test_classifies_rejections_with_message() {
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Email already registered"}"#,
        );
        assert!(matches!(err, ApiError::Rejected { status: 400, .. }));
        assert_eq!(err.user_message(), "Email already registered");

        let err = ApiError::from_response(StatusCode::NOT_FOUND, r#"{"error":"Order not found"}"#);
        assert_eq!(err.user_message(), "Order not found");

        let err = ApiError::from_response(StatusCode::UNPROCESSABLE_ENTITY, "quantity missing");
        assert_eq!(err.user_message(), "quantity missing");

        let err = ApiError::from_response(StatusCode::BAD_REQUEST, "  ");
        assert_eq!(err.user_message(), "The request was rejected.");
    }

    #[test]
    fn test_classifies_server_errors() {
        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert!(matches!(err, ApiError::Server { status: 502 }));
        assert!(!err.user_message().contains("oops"));
    }

    #[test]
    fn test_list_envelope_accepts_both_shapes() {
        let bare: ListEnvelope<i64> = serde_json::from_str("[1, 2]").unwrap();
        let wrapped: ListEnvelope<i64> = serde_json::from_str(r#"{"data": [3]}"#).unwrap();
        assert_eq!(bare.into_vec(), vec![1, 2]);
        assert_eq!(wrapped.into_vec(), vec![3]);
    }

    #[test]
    fn test_endpoint_joins_base_and_path() {
        let config = ApiConfig {
            base_url: url::Url::parse("http://localhost:3000/api/").unwrap(),
            timeout: std::time::Duration::from_secs(1),
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.endpoint("/users/me"), "http://localhost:3000/api/users/me");
    }
}
