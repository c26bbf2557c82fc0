//! The authenticated identity carried for a browser visit.

use serde::{Deserialize, Serialize};

use super::{AuthToken, Role, UserId};

/// Who is logged in.
///
/// Created on successful login or token hydration and dropped on logout or
/// token rejection. The token is non-empty and the role is one of the four
/// known values by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    /// Bearer token sent with every authenticated backend call.
    pub token: AuthToken,
    /// Role resolved by the backend's profile lookup.
    pub role: Role,
    /// Backend user ID.
    pub id: UserId,
}

impl UserSession {
    /// Create a new session.
    #[must_use]
    pub const fn new(token: AuthToken, role: Role, id: UserId) -> Self {
        Self { token, role, id }
    }

    /// Whether this session holds the given role.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}
