//! Authentication extractors.
//!
//! Every protected view takes one of the role extractors below. Each one
//! hydrates the session from the stored token and runs the route authorizer
//! before the handler body executes, so nothing role-specific is rendered
//! for a visitor who may not see it.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn dashboard(RequireClient(auth): RequireClient) -> impl IntoResponse {
//!     format!("Hello, user {}!", auth.user.id)
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use ldms_core::{Authorization, LOGIN_PATH, Role, UserSession, authorize};
use tower_sessions::Session;

use crate::error::set_sentry_user;
use crate::models::Chrome;
use crate::state::AppState;

/// A visitor who passed the role check.
pub struct Authorized {
    /// The hydrated identity.
    pub user: UserSession,
    /// The visitor's session record.
    pub session: Session,
    path: String,
}

impl Authorized {
    /// Navigation and pending notifications for rendering a page.
    pub async fn chrome(&self) -> Chrome {
        Chrome::load(&self.session, Some(&self.user), &self.path).await
    }
}

/// Any visitor, logged in or not.
pub struct Visitor {
    /// The hydrated identity, if the stored token is still accepted.
    pub user: Option<UserSession>,
    /// The visitor's session record.
    pub session: Session,
    path: String,
}

impl Visitor {
    /// Navigation and pending notifications for rendering a page.
    pub async fn chrome(&self) -> Chrome {
        Chrome::load(&self.session, self.user.as_ref(), &self.path).await
    }
}

/// Error returned when a view may not be shown.
#[derive(Debug)]
pub enum AuthRejection {
    /// Not logged in, or logged in with another role.
    RedirectToLogin,
    /// The session layer is not installed.
    MissingSessionLayer,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::MissingSessionLayer => {
                tracing::error!("Session layer missing from router");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

fn session_from_parts(parts: &Parts) -> Result<Session, AuthRejection> {
    parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or(AuthRejection::MissingSessionLayer)
}

/// Hydrate and authorize the request for `required`.
async fn require_role(
    parts: &Parts,
    state: &AppState,
    required: Role,
) -> Result<Authorized, AuthRejection> {
    let session = session_from_parts(parts)?;
    let user = state.sessions().hydrate(&session).await;

    match (authorize(user.as_ref(), required), user) {
        (Authorization::Authorized, Some(user)) => {
            set_sentry_user(user.id, user.role);
            Ok(Authorized {
                user,
                session,
                path: parts.uri.path().to_string(),
            })
        }
        (outcome, _) => {
            tracing::debug!(
                ?outcome,
                required = %required,
                path = %parts.uri.path(),
                "View refused"
            );
            Err(AuthRejection::RedirectToLogin)
        }
    }
}

impl FromRequestParts<AppState> for Visitor {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts)?;
        let user = state.sessions().hydrate(&session).await;
        if let Some(user) = &user {
            set_sentry_user(user.id, user.role);
        }

        Ok(Self {
            user,
            session,
            path: parts.uri.path().to_string(),
        })
    }
}

macro_rules! role_extractor {
    ($(#[$doc:meta])* $name:ident => $role:expr) => {
        $(#[$doc])*
        pub struct $name(pub Authorized);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AuthRejection;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                require_role(parts, state, $role).await.map(Self)
            }
        }
    };
}

role_extractor!(
    /// Extractor for client-only views.
    RequireClient => Role::Client
);

role_extractor!(
    /// Extractor for driver-only views.
    RequireDriver => Role::Driver
);

role_extractor!(
    /// Extractor for stock-manager-only views.
    RequireStockManager => Role::StockManager
);

role_extractor!(
    /// Extractor for admin-only views.
    RequireAdmin => Role::Admin
);
