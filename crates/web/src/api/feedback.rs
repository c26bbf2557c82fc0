//! Client feedback: `/feedbacks`.

use ldms_core::AuthToken;
use reqwest::Method;
use tracing::instrument;

use super::types::NewFeedback;
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Submit feedback (`POST /feedbacks`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the backend rejects it.
    #[instrument(skip(self, token, feedback), fields(user_id = %feedback.user_id))]
    pub async fn submit_feedback(
        &self,
        token: &AuthToken,
        feedback: &NewFeedback,
    ) -> Result<(), ApiError> {
        self.execute_unit(
            self.request(Method::POST, "/feedbacks", Some(token))
                .json(feedback),
        )
        .await
    }
}
