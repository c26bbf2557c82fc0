//! Account endpoints: `/users/*`.

use ldms_core::AuthToken;
use reqwest::Method;
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::instrument;

use super::types::{Credentials, LoginResponse, NewUser, Profile, UserBody};
use super::{ApiClient, ApiError};

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Create an account (`POST /users/register`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the backend refuses the registration.
    #[instrument(skip(self, user), fields(email = %user.email, role = %user.role))]
    pub async fn register(&self, user: &NewUser) -> Result<(), ApiError> {
        let body = UserBody {
            name: &user.name,
            email: &user.email,
            password: Some(user.password.expose_secret()),
            role: user.role,
        };
        self.execute_unit(self.request(Method::POST, "/users/register", None).json(&body))
            .await
    }

    /// Exchange credentials for a token (`POST /users/login`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` or `ApiError::Rejected` for bad
    /// credentials.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let body = LoginBody {
            email: &credentials.email,
            password: credentials.password.expose_secret(),
        };
        self.execute(self.request(Method::POST, "/users/login", None).json(&body))
            .await
    }

    /// Look up the account a token belongs to (`GET /users/me`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the token is no longer valid.
    #[instrument(skip_all)]
    pub async fn profile(&self, token: &AuthToken) -> Result<Profile, ApiError> {
        self.execute(self.request(Method::GET, "/users/me", Some(token)))
            .await
    }
}
