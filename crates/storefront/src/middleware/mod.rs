//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with in-memory store)
//! 5. Rejected-credential cleanup (logs out when the backend refuses the token)
//!
//! Guarding and cart access happen per handler through extractors rather
//! than as layers.

pub mod auth;
pub mod cart;
pub mod request_id;
pub mod session;

pub use auth::{
    CredentialRejected, GuardRejection, OptionalCredential, RequireAdmin, RequireAuth,
    clear_credential, expire_credential, expire_rejected_credential, load_credential,
    set_credential,
};
pub use cart::{SessionCart, load_cart};
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
