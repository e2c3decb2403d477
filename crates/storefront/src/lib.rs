//! Marigold Storefront library.
//!
//! This crate provides the storefront and admin console as a library, so the
//! binary, the in-crate tests and the integration tests all build the same
//! router through [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::{Router, middleware::from_fn, routing::get};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the storefront router with its session, tracing and request-id
/// layers. Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .layer(from_fn(middleware::expire_rejected_credential))
        .layer(session_layer)
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;
    use url::Url;

    use crate::config::StorefrontConfig;

    /// Router whose backend is unreachable; only routes that never call it
    /// can succeed.
    fn offline_app() -> Router {
        let config = StorefrontConfig::local(Url::parse("http://127.0.0.1:9/").unwrap());
        app(AppState::new(config).unwrap())
    }

    async fn get_path(path: &str) -> axum::response::Response {
        offline_app()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = get_path("/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_anonymous_profile_redirects_to_login() {
        let response = get_path("/profile").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login?from=%2Fprofile"
        );
    }

    #[tokio::test]
    async fn test_anonymous_admin_page_keeps_full_path() {
        let response = get_path("/admin/orders?status=SHIPPED").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login?from=%2Fadmin%2Forders%3Fstatus%3DSHIPPED"
        );
    }

    #[tokio::test]
    async fn test_empty_cart_page_renders() {
        let response = get_path("/cart").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("Your cart is empty"));
        assert!(html.contains("Cart (0)"));
    }

    #[tokio::test]
    async fn test_login_page_carries_continuation() {
        let response = get_path("/login?from=%2Fadmin&error=Bad%20password").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains(r#"name="from""#));
        assert!(html.contains("admin"));
        assert!(html.contains("Bad password"));
    }

    #[tokio::test]
    async fn test_backend_outage_is_bad_gateway() {
        let response = get_path("/categories").await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_empty_cart_checkout_is_refused() {
        let response = offline_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/cart/checkout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/cart?error=Your%20cart%20is%20empty"
        );
    }
}
