//! LDMS web client library.
//!
//! Server-rendered pages for the logistics management system. All business
//! data lives behind the REST backend; this crate handles sessions, role
//! routing, the client cart and presentation. It is a library so the
//! integration tests can build the router in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
