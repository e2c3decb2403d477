//! End-to-end tests for Marigold.
//!
//! Every test starts its own [`MockBackend`] and a storefront wired to it,
//! both on ephemeral ports, then drives the storefront over HTTP with a
//! client that keeps cookies and never follows redirects, so each test can
//! assert on the `Location` a form post answers with.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p marigold-integration-tests
//! ```
//!
//! No external services are needed.

pub mod backend;

use reqwest::{Client, Response, StatusCode, header::LOCATION, multipart, redirect::Policy};
use tokio::net::TcpListener;

use marigold_storefront::config::StorefrontConfig;
use marigold_storefront::state::AppState;

pub use backend::{ADMIN_EMAIL, CUSTOMER_EMAIL, MockBackend, PASSWORD, Upload};

/// Run `app` until the listener fails, reporting why it stopped.
#[allow(clippy::print_stderr)]
async fn serve(name: &'static str, listener: TcpListener, app: axum::Router) {
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("{name} stopped serving: {e}");
    }
}

/// A running storefront, its backend and a browser-like client.
pub struct TestContext {
    pub client: Client,
    pub backend: MockBackend,
    base_url: String,
}

impl TestContext {
    /// Start a backend and a storefront in front of it.
    pub async fn new() -> Self {
        let backend = MockBackend::spawn().await;

        let config = StorefrontConfig::local(backend.url());
        let state = AppState::new(config).expect("Failed to build storefront state");
        let app = marigold_storefront::app(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind storefront");
        let addr = listener.local_addr().expect("Storefront has no address");
        tokio::spawn(serve("storefront", listener, app));

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            backend,
            base_url: format!("http://{addr}"),
        }
    }

    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed")
    }

    /// GET a page that must render, returning its HTML.
    pub async fn page(&self, path: &str) -> String {
        let response = self.get(path).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {path}");
        response.text().await.expect("Failed to read page")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST failed")
    }

    pub async fn post_multipart(&self, path: &str, form: multipart::Form) -> Response {
        self.client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("POST failed")
    }

    /// Submit the login form, optionally carrying a continuation.
    pub async fn login(&self, email: &str, from: Option<&str>) -> Response {
        let mut form = vec![("email", email), ("password", PASSWORD)];
        if let Some(from) = from {
            form.push(("from", from));
        }
        self.post_form("/login", &form).await
    }

    /// Post a cart action for `product_id`.
    pub async fn cart(&self, action: &str, product_id: &str) -> Response {
        self.post_form(&format!("/cart/{action}"), &[("product_id", product_id)])
            .await
    }
}

/// The `Location` of a redirect response.
///
/// # Panics
///
/// Panics unless the response is a `303 See Other` with a location.
#[must_use]
pub fn location(response: &Response) -> String {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("Redirect without Location")
        .to_string()
}
