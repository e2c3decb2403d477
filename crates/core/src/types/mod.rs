//! Core types for Marigold.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod credential;
pub mod id;
pub mod price;
pub mod status;

pub use credential::{ADMIN_ROLE, Credential, Role};
pub use id::*;
pub use price::{Price, PriceError};
pub use status::{OrderStatus, ParseStatusError};
