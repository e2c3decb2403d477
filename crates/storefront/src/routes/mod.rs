//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                           - Product listing (?search=, ?page=)
//! GET  /health                     - Health check
//!
//! # Catalog
//! GET  /product/{id}               - Product detail
//! GET  /categories                 - Category listing
//! GET  /category/{id}              - Products in a category
//!
//! # Cart (post/redirect/get)
//! GET  /cart                       - Cart page
//! POST /cart/add                   - Add at quantity 1
//! POST /cart/increment             - One more unit
//! POST /cart/decrement             - One fewer unit, removing the last
//! POST /cart/remove                - Remove the line
//! POST /cart/checkout              - Place the order, clear on success
//!
//! # Auth
//! GET  /login                      - Login page (?from= continuation)
//! POST /login                      - Login action
//! GET  /register                   - Register page
//! POST /register                   - Register action
//! POST /logout                     - Logout action
//!
//! # Account (requires auth)
//! GET  /profile                    - Profile and order history
//! GET  /add-address                - Address form
//! GET  /edit-address               - Address form, prefilled
//! POST /address                    - Save address
//!
//! # Admin (requires admin)
//! GET  /admin                      - Dashboard
//! GET  /admin/categories           - Category table
//! POST /admin/categories           - Create category
//! GET  /admin/add-category         - New category form
//! GET  /admin/edit-category/{id}   - Edit category form
//! POST /admin/categories/{id}      - Rename category
//! POST /admin/categories/{id}/delete
//! GET  /admin/products             - Product table
//! POST /admin/products             - Create product (multipart)
//! GET  /admin/add-product          - New product form
//! GET  /admin/edit-product/{id}    - Edit product form
//! POST /admin/products/{id}        - Update product (multipart)
//! POST /admin/products/{id}/delete
//! GET  /admin/orders               - Order items (?status=)
//! GET  /admin/order-details/{id}   - Order item detail
//! POST /admin/order-details/{id}/status - Change status
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod home;
pub mod layout;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/increment", post(cart::increment))
        .route("/decrement", post(cart::decrement))
        .route("/remove", post(cart::remove))
        .route("/checkout", post(cart::checkout))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(account::profile))
        .route("/add-address", get(account::add_address_page))
        .route("/edit-address", get(account::edit_address_page))
        .route("/address", post(account::save_address))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .route("/product/{id}", get(products::show))
        .route("/categories", get(categories::index))
        .route("/category/{id}", get(categories::show))
        // Cart routes
        .nest("/cart", cart_routes())
        // Auth and account routes
        .merge(auth_routes())
        .merge(account_routes())
        // Admin console
        .nest("/admin", admin::admin_routes())
}
