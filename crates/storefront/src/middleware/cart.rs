//! Session-backed cart store extractor.
//!
//! Each request loads the session's cart into a [`CartStore`], dispatches
//! at most one action and writes the snapshot back. Two concurrent requests
//! from one session resolve as last write wins.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use tower_sessions::Session;

use marigold_core::{Cart, CartAction, CartStore};

use crate::models::session_keys;

/// The current session's cart store.
///
/// # Example
///
/// ```rust,ignore
/// async fn remove(mut cart: SessionCart, Form(form): Form<CartForm>) -> Result<Redirect> {
///     cart.dispatch(CartAction::Remove(form.product_id)).await?;
///     Ok(Redirect::to("/cart"))
/// }
/// ```
pub struct SessionCart {
    session: Session,
    store: CartStore,
}

impl<S> FromRequestParts<S> for SessionCart
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "Session layer missing"))?;

        let cart = load_cart(&session).await;

        Ok(Self {
            session,
            store: CartStore::from_snapshot(cart),
        })
    }
}

impl SessionCart {
    /// Read-only view of the cart.
    #[must_use]
    pub const fn snapshot(&self) -> &Cart {
        self.store.snapshot()
    }

    /// Apply one action and persist the result to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn dispatch(
        &mut self,
        action: CartAction,
    ) -> Result<&Cart, tower_sessions::session::Error> {
        let kind = action.kind();
        self.store.dispatch(action);
        self.session
            .insert(session_keys::CART, self.store.snapshot())
            .await?;

        tracing::debug!(
            action = kind,
            lines = self.store.snapshot().len(),
            items = self.store.snapshot().item_count(),
            "Cart updated"
        );

        Ok(self.store.snapshot())
    }
}

/// Read the cart from the session, empty when absent or unreadable.
pub async fn load_cart(session: &Session) -> Cart {
    match session.get::<Cart>(session_keys::CART).await {
        Ok(cart) => cart.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable session cart");
            Cart::new()
        }
    }
}
