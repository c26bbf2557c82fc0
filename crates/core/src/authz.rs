//! Route authorization by role.
//!
//! Evaluated on every navigation; nothing here is persisted.

use crate::types::{Role, UserSession};

/// Outcome of checking a session against a view's required role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    /// No session at all.
    Unauthenticated,
    /// Logged in, but as a different role.
    WrongRole,
    /// Logged in with the required role.
    Authorized,
}

impl Authorization {
    /// Whether the protected view may be rendered.
    #[must_use]
    pub const fn is_authorized(self) -> bool {
        matches!(self, Self::Authorized)
    }

    /// Where to send the visitor instead of the view, if anywhere.
    ///
    /// Wrong-role visitors go to login just like anonymous ones.
    #[must_use]
    pub const fn redirect(self) -> Option<&'static str> {
        match self {
            Self::Unauthenticated | Self::WrongRole => Some(LOGIN_PATH),
            Self::Authorized => None,
        }
    }
}

/// Path visitors are redirected to when a view is refused.
pub const LOGIN_PATH: &str = "/login";

/// Decide whether `session` may see a view that requires `required`.
#[must_use]
pub fn authorize(session: Option<&UserSession>, required: Role) -> Authorization {
    match session {
        None => Authorization::Unauthenticated,
        Some(session) if !session.has_role(required) => Authorization::WrongRole,
        Some(_) => Authorization::Authorized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuthToken, UserId};

    fn session(role: Role) -> UserSession {
        UserSession::new(
            AuthToken::parse("t1").expect("valid token"),
            role,
            UserId::new(1),
        )
    }

    #[test]
    fn test_no_session_is_unauthenticated_for_every_role() {
        for required in Role::ALL {
            let outcome = authorize(None, required);
            assert_eq!(outcome, Authorization::Unauthenticated);
            assert_eq!(outcome.redirect(), Some("/login"));
        }
    }

    #[test]
    fn test_only_matching_role_is_authorized() {
        for actual in Role::ALL {
            let s = session(actual);
            for required in Role::ALL {
                let outcome = authorize(Some(&s), required);
                if actual == required {
                    assert!(outcome.is_authorized());
                    assert_eq!(outcome.redirect(), None);
                } else {
                    assert_eq!(outcome, Authorization::WrongRole);
                    assert_eq!(outcome.redirect(), Some("/login"));
                }
            }
        }
    }
}
