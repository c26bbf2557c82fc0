//! User roles and the per-role navigation table.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a role string is not one of the four known roles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid role: {0}")]
pub struct RoleParseError(pub String);

/// Role of an authenticated user.
///
/// Determines which views and backend calls are permitted. The set is
/// closed: anything the backend sends outside these four values is
/// rejected when the session is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    /// Browses products and places orders.
    Client,
    /// Delivers orders assigned to them.
    Driver,
    /// Manages inventory and order fulfilment.
    StockManager,
    /// Manages users and sees system-wide data.
    Admin,
}

/// A link in the navigation chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    /// Link text.
    pub title: &'static str,
    /// Target path.
    pub href: &'static str,
}

const fn link(title: &'static str, href: &'static str) -> NavLink {
    NavLink { title, href }
}

const CLIENT_NAV: &[NavLink] = &[
    link("Dashboard", "/client"),
    link("Products", "/client/products"),
    link("Cart", "/client/cart"),
    link("My Orders", "/client/orders"),
    link("Feedback", "/client/feedback"),
];

const DRIVER_NAV: &[NavLink] = &[link("Deliveries", "/driver")];

const STOCK_MANAGER_NAV: &[NavLink] = &[
    link("Dashboard", "/stock-manager"),
    link("Manage Stock", "/stock-manager/stocks"),
    link("Manage Orders", "/stock-manager/orders"),
];

const ADMIN_NAV: &[NavLink] = &[
    link("Dashboard", "/admin"),
    link("Users", "/admin/users"),
    link("Orders", "/admin/orders"),
    link("Transports", "/admin/transports"),
    link("Reports", "/admin/reports"),
];

/// Navigation shown to visitors without a session.
pub const PUBLIC_NAV: &[NavLink] = &[
    link("Home", "/"),
    link("Login", "/login"),
    link("Register", "/register"),
];

impl Role {
    /// All roles, in the order offered on registration forms.
    pub const ALL: [Self; 4] = [Self::Client, Self::Driver, Self::StockManager, Self::Admin];

    /// Wire name used by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Driver => "driver",
            Self::StockManager => "stockManager",
            Self::Admin => "admin",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Client => "Client",
            Self::Driver => "Driver",
            Self::StockManager => "Stock Manager",
            Self::Admin => "Admin",
        }
    }

    /// Landing page after login.
    #[must_use]
    pub const fn dashboard_path(self) -> &'static str {
        match self {
            Self::Client => "/client",
            Self::Driver => "/driver",
            Self::StockManager => "/stock-manager",
            Self::Admin => "/admin",
        }
    }

    /// Navigation chrome rendered around this role's views.
    #[must_use]
    pub const fn navigation(self) -> &'static [NavLink] {
        match self {
            Self::Client => CLIENT_NAV,
            Self::Driver => DRIVER_NAV,
            Self::StockManager => STOCK_MANAGER_NAV,
            Self::Admin => ADMIN_NAV,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| RoleParseError(s.to_string()))
    }
}
