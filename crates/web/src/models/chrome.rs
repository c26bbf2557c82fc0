//! Page chrome: navigation and notifications around every view.

use ldms_core::{NavLink, PUBLIC_NAV, UserSession};
use tower_sessions::Session;

use super::flash::{self, Flash};

/// What the base layout needs besides the page body.
#[derive(Debug, Clone)]
pub struct Chrome {
    /// Links for the visitor's role, or the public links.
    pub nav: &'static [NavLink],
    /// Role label shown next to the logout button.
    pub role_label: Option<&'static str>,
    /// Notifications to show once.
    pub flashes: Vec<Flash>,
    /// Path of the page being rendered.
    pub current_path: String,
}

impl Chrome {
    /// Build the chrome for a request, taking any queued notifications.
    pub async fn load(session: &Session, user: Option<&UserSession>, path: &str) -> Self {
        let flashes = flash::take(session).await;
        Self::new(user, flashes, path)
    }

    /// Build the chrome from already-known parts.
    #[must_use]
    pub fn new(user: Option<&UserSession>, flashes: Vec<Flash>, path: &str) -> Self {
        Self {
            nav: user.map_or(PUBLIC_NAV, |u| u.role.navigation()),
            role_label: user.map(|u| u.role.label()),
            flashes,
            current_path: path.to_string(),
        }
    }

    /// Whether `href` is the page being rendered.
    #[must_use]
    pub fn is_current(&self, href: &str) -> bool {
        self.current_path == href
    }
}
