//! Cart route handlers.
//!
//! Every mutation loads the session cart, dispatches exactly one
//! [`CartAction`] and redirects back (post/redirect/get). Product data for
//! `add` and `increment` is fetched from the backend by id, so a client
//! cannot choose the price of a line.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State, response::Redirect};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use marigold_core::guard::LOGIN_PATH;
use marigold_core::{AccessLevel, Cart, CartAction, ProductId, RenderDecision, evaluate};

use crate::api::ApiError;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{OptionalCredential, SessionCart, expire_credential};
use crate::routes::layout::{Layout, redirect_error, redirect_success, return_path};
use crate::state::AppState;

const CART_PATH: &str = "/cart";

/// Shown when checkout is attempted without a login.
pub const LOGIN_REQUIRED_MESSAGE: &str = "You need to login first before you can place an order";

/// Cart mutation form data.
#[derive(Debug, Deserialize)]
pub struct CartForm {
    pub product_id: ProductId,
    pub return_to: Option<String>,
}

impl CartForm {
    fn back(&self) -> String {
        return_path(self.return_to.as_deref(), CART_PATH)
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub cart: Cart,
}

/// Display cart page.
#[instrument(skip_all)]
pub async fn show(layout: Layout, cart: SessionCart) -> CartShowTemplate {
    CartShowTemplate {
        layout,
        cart: cart.snapshot().clone(),
    }
}

/// Add a product at quantity 1 (no change if already in the cart).
#[instrument(skip(state, cart))]
pub async fn add(
    State(state): State<AppState>,
    mut cart: SessionCart,
    Form(form): Form<CartForm>,
) -> Result<Redirect> {
    let back = form.back();
    let product = match state.api().product(form.product_id).await {
        Ok(product) => product,
        Err(e) => return Ok(product_unavailable(&back, &e)),
    };

    cart.dispatch(CartAction::Add(product.to_cart_product()))
        .await?;
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", &form.product_id.to_string())]),
    );

    Ok(Redirect::to(&back))
}

/// Add one unit of a product.
#[instrument(skip(state, cart))]
pub async fn increment(
    State(state): State<AppState>,
    mut cart: SessionCart,
    Form(form): Form<CartForm>,
) -> Result<Redirect> {
    let back = form.back();
    let product = match state.api().product(form.product_id).await {
        Ok(product) => product,
        Err(e) => return Ok(product_unavailable(&back, &e)),
    };

    cart.dispatch(CartAction::Increment(product.to_cart_product()))
        .await?;

    Ok(Redirect::to(&back))
}

/// Remove one unit, dropping the line when the last unit goes.
#[instrument(skip(cart))]
pub async fn decrement(mut cart: SessionCart, Form(form): Form<CartForm>) -> Result<Redirect> {
    let action = CartAction::step_down(cart.snapshot(), form.product_id);
    cart.dispatch(action).await?;
    Ok(Redirect::to(&form.back()))
}

/// Remove a product's line entirely.
#[instrument(skip(cart))]
pub async fn remove(mut cart: SessionCart, Form(form): Form<CartForm>) -> Result<Redirect> {
    cart.dispatch(CartAction::Remove(form.product_id)).await?;
    Ok(Redirect::to(&form.back()))
}

/// Place an order for the cart contents.
///
/// The cart is cleared only when the backend accepts the order. A
/// credential the backend no longer accepts is dropped and the client sent
/// to log in again.
#[instrument(skip_all)]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    OptionalCredential(credential): OptionalCredential,
    mut cart: SessionCart,
) -> Result<Redirect> {
    if cart.snapshot().is_empty() {
        return Ok(redirect_error(CART_PATH, "Your cart is empty"));
    }

    let decision = evaluate(AccessLevel::Authenticated, &credential, CART_PATH);
    let (RenderDecision::Render, Some(credential)) = (&decision, credential) else {
        let target = decision
            .redirect_target()
            .unwrap_or_else(|| LOGIN_PATH.to_string());
        return Ok(redirect_error(&target, LOGIN_REQUIRED_MESSAGE));
    };

    let order = cart.snapshot().to_order_request();
    match state.api().place_order(&credential, &order).await {
        Ok(message) => {
            tracing::info!(
                items = order.items.len(),
                total = %order.total_price,
                "Order placed"
            );
            cart.dispatch(CartAction::Clear).await?;
            Ok(redirect_success(CART_PATH, &message))
        }
        Err(ApiError::Unauthorized(_)) => Ok(expire_credential(&session, CART_PATH).await),
        Err(e) => {
            tracing::warn!(error = %e, "Checkout failed");
            Ok(redirect_error(CART_PATH, &e.user_message()))
        }
    }
}

fn product_unavailable(back: &str, error: &ApiError) -> Redirect {
    tracing::warn!(error = %error, "Cart update with unavailable product");
    let message = match error {
        ApiError::NotFound(_) => "That product is no longer available".to_string(),
        other => other.user_message(),
    };
    redirect_error(back, &message)
}
