//! Order endpoints: `/orders/*`.

use ldms_core::{AuthToken, OrderId, OrderStatus, UserId};
use reqwest::Method;
use tracing::instrument;

use super::types::{DriverAssignment, NewOrder, Order, StatusUpdate};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// List every order (`GET /orders`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip_all)]
    pub async fn list_orders(&self, token: &AuthToken) -> Result<Vec<Order>, ApiError> {
        self.execute_list(self.request(Method::GET, "/orders", Some(token)))
            .await
    }

    /// List a client's orders (`GET /orders/user/:id`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, token))]
    pub async fn list_user_orders(
        &self,
        token: &AuthToken,
        user_id: UserId,
    ) -> Result<Vec<Order>, ApiError> {
        self.execute_list(self.request(Method::GET, &format!("/orders/user/{user_id}"), Some(token)))
            .await
    }

    /// List orders assigned to a driver (`GET /orders/driver/:id`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, token))]
    pub async fn list_driver_orders(
        &self,
        token: &AuthToken,
        driver_id: UserId,
    ) -> Result<Vec<Order>, ApiError> {
        self.execute_list(self.request(
            Method::GET,
            &format!("/orders/driver/{driver_id}"),
            Some(token),
        ))
        .await
    }

    /// Fetch one order (`GET /orders/:id`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with status 404 if there is no such order.
    #[instrument(skip(self, token))]
    pub async fn get_order(&self, token: &AuthToken, id: OrderId) -> Result<Order, ApiError> {
        self.execute(self.request(Method::GET, &format!("/orders/{id}"), Some(token)))
            .await
    }

    /// Place an order (`POST /orders`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the backend rejects it.
    #[instrument(skip(self, token), fields(product_id = %order.product_id, quantity = order.quantity.get()))]
    pub async fn create_order(&self, token: &AuthToken, order: &NewOrder) -> Result<(), ApiError> {
        self.execute_unit(self.request(Method::POST, "/orders", Some(token)).json(order))
            .await
    }

    /// Move an order to a new status (`PUT /orders/:id/status`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the transition is refused.
    #[instrument(skip(self, token))]
    pub async fn update_order_status(
        &self,
        token: &AuthToken,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        self.execute_unit(
            self.request(Method::PUT, &format!("/orders/{id}/status"), Some(token))
                .json(&StatusUpdate { status }),
        )
        .await
    }

    /// Assign an order to a driver (`PUT /orders/:id/assign`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, token))]
    pub async fn assign_order(
        &self,
        token: &AuthToken,
        id: OrderId,
        driver_id: UserId,
    ) -> Result<(), ApiError> {
        self.execute_unit(
            self.request(Method::PUT, &format!("/orders/{id}/assign"), Some(token))
                .json(&DriverAssignment { driver_id }),
        )
        .await
    }

    /// Cancel an order (`PUT /orders/cancel/:id`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the order can no longer be
    /// cancelled.
    #[instrument(skip(self, token))]
    pub async fn cancel_order(&self, token: &AuthToken, id: OrderId) -> Result<(), ApiError> {
        self.execute_unit(self.request(Method::PUT, &format!("/orders/cancel/{id}"), Some(token)))
            .await
    }

    /// Mark an order delivered (`PUT /orders/mark-delivered/:id`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, token))]
    pub async fn mark_order_delivered(
        &self,
        token: &AuthToken,
        id: OrderId,
    ) -> Result<(), ApiError> {
        self.execute_unit(self.request(
            Method::PUT,
            &format!("/orders/mark-delivered/{id}"),
            Some(token),
        ))
        .await
    }

    /// Delete an order (`DELETE /orders/:id`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_order(&self, token: &AuthToken, id: OrderId) -> Result<(), ApiError> {
        self.execute_unit(self.request(Method::DELETE, &format!("/orders/{id}"), Some(token)))
            .await
    }
}
