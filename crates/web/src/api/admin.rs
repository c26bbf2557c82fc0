//! Admin endpoints: `/admin/*`.

use ldms_core::{AuthToken, UserId};
use reqwest::Method;
use secrecy::ExposeSecret;
use tracing::instrument;

use super::types::{NewUser, Order, Transport, User, UserBody, UserUpdate};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// List every account (`GET /admin/users`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip_all)]
    pub async fn list_users(&self, token: &AuthToken) -> Result<Vec<User>, ApiError> {
        self.execute_list(self.request(Method::GET, "/admin/users", Some(token)))
            .await
    }

    /// Create an account with any role (`POST /admin/users`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the backend rejects it.
    #[instrument(skip(self, token, user), fields(email = %user.email, role = %user.role))]
    pub async fn create_user(&self, token: &AuthToken, user: &NewUser) -> Result<(), ApiError> {
        let body = UserBody {
            name: &user.name,
            email: &user.email,
            password: Some(user.password.expose_secret()),
            role: user.role,
        };
        self.execute_unit(
            self.request(Method::POST, "/admin/users", Some(token))
                .json(&body),
        )
        .await
    }

    /// Update an account (`PUT /admin/users/:id`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the backend rejects it.
    #[instrument(skip(self, token, update), fields(role = %update.role))]
    pub async fn update_user(
        &self,
        token: &AuthToken,
        id: UserId,
        update: &UserUpdate,
    ) -> Result<(), ApiError> {
        let body = UserBody {
            name: &update.name,
            email: &update.email,
            password: update.password.as_ref().map(|p| p.expose_secret()),
            role: update.role,
        };
        self.execute_unit(
            self.request(Method::PUT, &format!("/admin/users/{id}"), Some(token))
                .json(&body),
        )
        .await
    }

    /// Delete an account (`DELETE /admin/users/:id`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_user(&self, token: &AuthToken, id: UserId) -> Result<(), ApiError> {
        self.execute_unit(self.request(
            Method::DELETE,
            &format!("/admin/users/{id}"),
            Some(token),
        ))
        .await
    }

    /// System-wide order listing (`GET /admin/orders`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip_all)]
    pub async fn admin_orders(&self, token: &AuthToken) -> Result<Vec<Order>, ApiError> {
        self.execute_list(self.request(Method::GET, "/admin/orders", Some(token)))
            .await
    }

    /// Transport listing (`GET /admin/transports`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip_all)]
    pub async fn list_transports(&self, token: &AuthToken) -> Result<Vec<Transport>, ApiError> {
        self.execute_list(self.request(Method::GET, "/admin/transports", Some(token)))
            .await
    }

    /// Free-form dashboard figures (`GET /admin/dashboard-data`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip_all)]
    pub async fn dashboard_data(&self, token: &AuthToken) -> Result<serde_json::Value, ApiError> {
        self.execute(self.request(Method::GET, "/admin/dashboard-data", Some(token)))
            .await
    }

    /// Free-form reports (`GET /admin/reports`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip_all)]
    pub async fn reports(&self, token: &AuthToken) -> Result<serde_json::Value, ApiError> {
        self.execute(self.request(Method::GET, "/admin/reports", Some(token)))
            .await
    }
}
