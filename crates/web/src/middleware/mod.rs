//! HTTP middleware stack for the web client.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame options, caching)
//! 5. Session layer (tower-sessions, `SQLite` store in production)
//!
//! Authentication is not a layer: protected views take a role extractor
//! from [`auth`].

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    AuthRejection, Authorized, RequireAdmin, RequireClient, RequireDriver, RequireStockManager,
    Visitor,
};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
