//! Business logic services for the web client.
//!
//! # Services
//!
//! - `auth` - Session store: hydrate, login, logout
//! - `checkout` - Turning cart lines into backend orders

pub mod auth;
pub mod checkout;
