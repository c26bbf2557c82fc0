//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::api::{ApiClient, ApiError};
use crate::config::WebConfig;
use crate::services::auth::SessionStore;
use crate::services::checkout::CheckoutGuard;

/// How long a successful profile lookup is trusted.
const PROFILE_CACHE_TTL: Duration = Duration::from_secs(30);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the backend client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    api: ApiClient,
    sessions: SessionStore,
    checkouts: CheckoutGuard,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the backend client cannot be built.
    pub fn new(config: WebConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api)?;
        let sessions = SessionStore::new(api.clone(), PROFILE_CACHE_TTL);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                sessions,
                checkouts: CheckoutGuard::new(),
            }),
        })
    }

    /// Get a reference to the web client configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the backend client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    /// Get a reference to the per-user cart guard.
    #[must_use]
    pub fn checkouts(&self) -> &CheckoutGuard {
        &self.inner.checkouts
    }
}
