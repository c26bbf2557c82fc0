//! Core types for LDMS.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod role;
pub mod session;
pub mod status;
pub mod token;

pub use id::*;
pub use price::Price;
pub use role::{NavLink, PUBLIC_NAV, Role, RoleParseError};
pub use session::UserSession;
pub use status::*;
pub use token::{AuthToken, TokenError};
