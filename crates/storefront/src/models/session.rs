//! Session-related types.

/// Session keys for cookie-session data.
pub mod keys {
    /// Key for the visitor's cart-session id.
    pub const CART_SESSION_ID: &str = "cart_session_id";
}
