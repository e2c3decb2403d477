//! Admin console route handlers.
//!
//! Every handler takes [`RequireAdmin`], so a customer or anonymous client
//! is redirected to `/login?from=<requested location>` before any backend
//! call is made. A credential the backend rejects mid-session is cleared
//! by [`crate::middleware::expire_rejected_credential`].

pub mod categories;
pub mod orders;
pub mod products;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::instrument;

use crate::api::ApiError;
use crate::filters;
use crate::middleware::{CredentialRejected, RequireAdmin};
use crate::routes::layout::{Layout, redirect_error};
use crate::state::AppState;

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
}

/// Display the admin dashboard.
#[instrument(skip_all)]
pub async fn dashboard(RequireAdmin(_credential): RequireAdmin, layout: Layout) -> DashboardTemplate {
    DashboardTemplate { layout }
}

/// Answer a failed admin write by going back to `back` with the backend's
/// message. A rejected credential is flagged so the login continues there.
fn write_failed(back: &str, action: &str, error: &ApiError) -> Response {
    tracing::warn!("{} failed: {}", action, error);
    let mut response = redirect_error(back, &error.user_message()).into_response();
    if matches!(error, ApiError::Unauthorized(_)) {
        response
            .extensions_mut()
            .insert(CredentialRejected::continue_to(back));
    }
    response
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        // Categories
        .route(
            "/categories",
            get(categories::index).post(categories::create),
        )
        .route("/add-category", get(categories::new_page))
        .route("/edit-category/{id}", get(categories::edit_page))
        .route("/categories/{id}", post(categories::update))
        .route("/categories/{id}/delete", post(categories::delete))
        // Products
        .route("/products", get(products::index).post(products::create))
        .route("/add-product", get(products::new_page))
        .route("/edit-product/{id}", get(products::edit_page))
        .route("/products/{id}", post(products::update))
        .route("/products/{id}/delete", post(products::delete))
        // Orders
        .route("/orders", get(orders::index))
        .route("/order-details/{id}", get(orders::show))
        .route("/order-details/{id}/status", post(orders::update_status))
}
