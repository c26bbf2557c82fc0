//! Session store: who is logged in for a browser visit.
//!
//! The bearer token is the only thing persisted, under the session key
//! `token`. Every request re-derives the [`UserSession`] from it by asking
//! the backend who the token belongs to (`hydrate`). Profile lookups are
//! cached briefly so a page view does not cost a backend round trip.

mod error;

pub use error::AuthError;

use std::time::Duration;

use ldms_core::{AuthToken, UserSession};
use moka::future::Cache;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{ApiClient, ApiError, Credentials, LoginResponse, Profile};
use crate::models::session_keys;

/// Upper bound on cached profiles.
const PROFILE_CACHE_CAPACITY: u64 = 10_000;

/// The backend calls the session store depends on.
pub trait IdentityProvider: Send + Sync {
    /// Exchange credentials for a token.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send;

    /// Resolve a token to the account it belongs to.
    fn profile(&self, token: &AuthToken) -> impl Future<Output = Result<Profile, ApiError>> + Send;
}

impl IdentityProvider for ApiClient {
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send {
        Self::login(self, credentials)
    }

    fn profile(&self, token: &AuthToken) -> impl Future<Output = Result<Profile, ApiError>> + Send {
        Self::profile(self, token)
    }
}

/// Hydrates, creates and destroys user sessions.
pub struct SessionStore<P = ApiClient> {
    provider: P,
    profiles: Cache<AuthToken, Profile>,
}

impl<P: IdentityProvider> SessionStore<P> {
    /// Create a session store; successful profile lookups are reused for
    /// `profile_ttl`.
    #[must_use]
    pub fn new(provider: P, profile_ttl: Duration) -> Self {
        Self {
            provider,
            profiles: Cache::builder()
                .max_capacity(PROFILE_CACHE_CAPACITY)
                .time_to_live(profile_ttl)
                .build(),
        }
    }

    /// Restore the session from the persisted token.
    ///
    /// Returns `None` when there is no token. If the token cannot be read or
    /// the backend does not accept it, for whatever reason, it is removed so
    /// the next request starts clean.
    #[instrument(skip_all)]
    pub async fn hydrate(&self, session: &Session) -> Option<UserSession> {
        let token = match session.get::<AuthToken>(session_keys::TOKEN).await {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable token in session, discarding");
                self.forget(session).await;
                return None;
            }
        };

        let lookup = self
            .profiles
            .try_get_with(token.clone(), self.provider.profile(&token))
            .await;

        match lookup {
            Ok(profile) => Some(UserSession::new(token, profile.role, profile.id)),
            Err(e) => {
                tracing::info!(error = %e, "Stored token not accepted, discarding");
                self.forget(session).await;
                None
            }
        }
    }

    /// Log in and persist the token.
    ///
    /// Nothing is written to the session unless both the login and the
    /// profile lookup succeed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a wrong email/password,
    /// `AuthError::Api` for other backend failures, and `AuthError::Session`
    /// if the token cannot be stored.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(
        &self,
        session: &Session,
        credentials: &Credentials,
    ) -> Result<UserSession, AuthError> {
        let LoginResponse { token, role } = self
            .provider
            .login(credentials)
            .await
            .map_err(AuthError::from_login)?;
        let profile = self.provider.profile(&token).await?;

        if profile.role != role {
            tracing::warn!(
                login_role = %role,
                profile_role = %profile.role,
                "Login and profile disagree on role, using profile"
            );
        }

        // New session ID on privilege change
        session.cycle_id().await?;
        session.insert(session_keys::TOKEN, &token).await?;
        self.profiles.insert(token.clone(), profile.clone()).await;

        tracing::info!(user_id = %profile.id, role = %profile.role, "User logged in");
        Ok(UserSession::new(token, profile.role, profile.id))
    }

    /// Log out: drop the whole session record.
    ///
    /// Never fails from the caller's point of view; storage errors are
    /// logged.
    #[instrument(skip_all)]
    pub async fn logout(&self, session: &Session) {
        if let Ok(Some(token)) = session.get::<AuthToken>(session_keys::TOKEN).await {
            self.profiles.invalidate(&token).await;
        }
        if let Err(e) = session.flush().await {
            tracing::error!(error = %e, "Failed to clear session on logout");
        }
    }

    /// Remove the persisted token, keeping the rest of the session.
    ///
    /// Used when the backend stops accepting the token mid-visit.
    pub async fn forget(&self, session: &Session) {
        match session.remove::<AuthToken>(session_keys::TOKEN).await {
            Ok(Some(token)) => self.profiles.invalidate(&token).await,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read token while discarding it");
                if let Err(e) = session.remove_value(session_keys::TOKEN).await {
                    tracing::error!(error = %e, "Failed to remove token from session");
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ldms_core::{Role, UserId};
    use secrecy::{ExposeSecret, SecretString};
    use tower_sessions::MemoryStore;

    use super::*;

    /// Accepts `a@b.com`/`x` and the token `t1`.
    #[derive(Default)]
    struct FakeProvider {
        profile_calls: AtomicUsize,
    }

    impl IdentityProvider for FakeProvider {
        async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
            if credentials.email == "a@b.com" && credentials.password.expose_secret() == "x" {
                Ok(LoginResponse {
                    token: AuthToken::parse("t1").unwrap(),
                    role: Role::Client,
                })
            } else {
                Err(ApiError::Unauthorized)
            }
        }

        async fn profile(&self, token: &AuthToken) -> Result<Profile, ApiError> {
            self.profile_calls.fetch_add(1, Ordering::SeqCst);
            if token.expose() == "t1" {
                Ok(Profile {
                    id: UserId::new(1),
                    role: Role::Client,
                    name: None,
                })
            } else {
                Err(ApiError::Unauthorized)
            }
        }
    }

    fn store() -> SessionStore<FakeProvider> {
        SessionStore::new(FakeProvider::default(), Duration::from_secs(60))
    }

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn credentials(password: &str) -> Credentials {
        Credentials {
            email: "a@b.com".to_string(),
            password: SecretString::from(password),
        }
    }

    #[tokio::test]
    async fn test_hydrate_without_token_is_anonymous() {
        let store = store();
        assert!(store.hydrate(&session()).await.is_none());
        assert_eq!(store.provider.profile_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_login_persists_token_and_hydrates() {
        let store = store();
        let session = session();

        let user = store.login(&session, &credentials("x")).await.unwrap();
        assert_eq!(user.role, Role::Client);
        assert_eq!(user.id, UserId::new(1));

        let stored: Option<AuthToken> = session.get(session_keys::TOKEN).await.unwrap();
        assert_eq!(stored.unwrap().expose(), "t1");

        let hydrated = store.hydrate(&session).await.unwrap();
        assert_eq!(hydrated, user);
    }

    #[tokio::test]
    async fn test_failed_login_leaves_session_untouched() {
        let store = store();
        let session = session();

        let err = store.login(&session, &credentials("wrong")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(session.is_empty().await);
    }

    #[tokio::test]
    async fn test_rejected_token_is_removed_on_hydrate() {
        let store = store();
        let session = session();
        session
            .insert(session_keys::TOKEN, AuthToken::parse("stale").unwrap())
            .await
            .unwrap();

        assert!(store.hydrate(&session).await.is_none());
        let stored: Option<AuthToken> = session.get(session_keys::TOKEN).await.unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn test_unreadable_token_is_removed_on_hydrate() {
        let store = store();
        let session = session();
        session.insert(session_keys::TOKEN, "").await.unwrap();

        assert!(store.hydrate(&session).await.is_none());
        assert!(session.get_value(session_keys::TOKEN).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_profile_lookups_are_cached() {
        let store = store();
        let session = session();
        store.login(&session, &credentials("x")).await.unwrap();

        for _ in 0..3 {
            assert!(store.hydrate(&session).await.is_some());
        }
        // Only the lookup made during login
        assert_eq!(store.provider.profile_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let store = store();
        let session = session();
        store.login(&session, &credentials("x")).await.unwrap();

        store.logout(&session).await;

        assert!(store.hydrate(&session).await.is_none());
    }
}
