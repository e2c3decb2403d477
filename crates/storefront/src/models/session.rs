//! Session-related keys.
//!
//! The session holds the login credential (`marigold_core::Credential`) and
//! the cart snapshot (`marigold_core::Cart`). Both are serialized as JSON by
//! the session store.

/// Session keys for authentication and cart data.
pub mod keys {
    /// Key for the login credential returned by the backend.
    pub const CREDENTIAL: &str = "credential";

    /// Key for the cart snapshot.
    pub const CART: &str = "cart";
}
