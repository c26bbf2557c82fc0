//! Session-related types.
//!
//! Everything the web client remembers about a browser lives in its
//! tower-sessions record under these keys.

/// Session keys.
pub mod keys {
    /// Key for the backend bearer token. This is the only identity state
    /// kept; role and user ID are re-derived from it on every request.
    pub const TOKEN: &str = "token";

    /// Key for the client's cart.
    pub const CART: &str = "cart";

    /// Key for pending notifications.
    pub const FLASH: &str = "flash";
}
