//! Inventory endpoints: `/stocks/*`.

use ldms_core::{AuthToken, StockId};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::instrument;

use super::types::{Stock, StockForm};
use super::{ApiClient, ApiError};

impl StockForm {
    /// Build the multipart body the backend expects.
    fn into_multipart(self) -> Result<Form, ApiError> {
        let mut form = Form::new()
            .text("name", self.name)
            .text("category", self.category)
            .text("upc", self.upc)
            .text("price", self.price)
            .text("inStock", self.in_stock)
            .text("totalValue", self.total_value)
            .text("status", self.status.as_str())
            .text("description", self.description);

        if let Some(image) = self.image {
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.content_type)?;
            form = form.part("image", part);
        }

        Ok(form)
    }
}

impl ApiClient {
    /// List all stock records (`GET /stocks`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip_all)]
    pub async fn list_stocks(&self, token: &AuthToken) -> Result<Vec<Stock>, ApiError> {
        self.execute_list(self.request(Method::GET, "/stocks", Some(token)))
            .await
    }

    /// Create a stock record (`POST /stocks`, multipart).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the backend rejects it.
    #[instrument(skip(self, token, form), fields(name = %form.name))]
    pub async fn create_stock(&self, token: &AuthToken, form: StockForm) -> Result<(), ApiError> {
        let body = form.into_multipart()?;
        self.execute_unit(
            self.request(Method::POST, "/stocks", Some(token))
                .multipart(body),
        )
        .await
    }

    /// Replace a stock record (`PUT /stocks/:id`, multipart).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the backend rejects it.
    #[instrument(skip(self, token, form), fields(name = %form.name))]
    pub async fn update_stock(
        &self,
        token: &AuthToken,
        id: StockId,
        form: StockForm,
    ) -> Result<(), ApiError> {
        let body = form.into_multipart()?;
        self.execute_unit(
            self.request(Method::PUT, &format!("/stocks/{id}"), Some(token))
                .multipart(body),
        )
        .await
    }

    /// Delete a stock record (`DELETE /stocks/:id`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_stock(&self, token: &AuthToken, id: StockId) -> Result<(), ApiError> {
        self.execute_unit(self.request(Method::DELETE, &format!("/stocks/{id}"), Some(token)))
            .await
    }
}
