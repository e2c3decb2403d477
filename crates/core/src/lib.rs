//! Marigold Core - cart store, route guard and shared types.
//!
//! This crate provides the pieces of Marigold that carry real state
//! semantics, shared by the storefront binary and its tests:
//! - `storefront` - Customer pages and the admin console
//! - `integration-tests` - End-to-end tests against a mock backend
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no session storage. Every operation here is synchronous and
//! total over its inputs.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, order statuses and the login credential
//! - [`cart`] - Cart lines, the closed action set and the cart store
//! - [`guard`] - Render-or-redirect decisions for protected pages
//! - [`pagination`] - Page slicing for listing views

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod guard;
pub mod pagination;
pub mod types;

pub use cart::{Cart, CartAction, CartLine, CartProduct, CartStore, OrderItemRequest, OrderRequest};
pub use guard::{AccessLevel, CredentialStore, NavigationState, RenderDecision, evaluate};
pub use pagination::Page;
pub use types::*;
