//! Driver listing: `/drivers`.

use ldms_core::AuthToken;
use reqwest::Method;
use tracing::instrument;

use super::types::Driver;
use super::{ApiClient, ApiError};

impl ApiClient {
    /// List drivers available for assignment (`GET /drivers`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip_all)]
    pub async fn list_drivers(&self, token: &AuthToken) -> Result<Vec<Driver>, ApiError> {
        self.execute_list(self.request(Method::GET, "/drivers", Some(token)))
            .await
    }
}
