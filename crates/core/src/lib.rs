//! LDMS Core - Shared domain types.
//!
//! This crate provides the types used by the LDMS web client:
//! - identities and roles of the logged-in user
//! - the route authorizer deciding who may see a role-specific view
//! - the cart accumulator clients build orders in
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! HTTP clients, no session storage. The web crate wires these into
//! request handlers.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, roles, tokens, sessions, prices and statuses
//! - [`authz`] - Route authorization by role
//! - [`cart`] - Client-side cart accumulator

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod authz;
pub mod cart;
pub mod types;

pub use authz::{Authorization, LOGIN_PATH, authorize};
pub use cart::{Cart, CartEntry, CartError, ProductRef, Quantity, QuantityError};
pub use types::*;
