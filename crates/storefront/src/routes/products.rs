//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use marigold_core::{Cart, ProductId};

use crate::api::Product;
use crate::error::Result;
use crate::filters;
use crate::middleware::SessionCart;
use crate::routes::layout::{Layout, Pager};
use crate::state::AppState;

/// A product with how many units the cart holds.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub product: Product,
    pub quantity: u32,
}

impl ProductCard {
    #[must_use]
    pub const fn in_cart(&self) -> bool {
        self.quantity > 0
    }
}

/// Pair each product with its cart quantity.
#[must_use]
pub fn cards(products: Vec<Product>, cart: &Cart) -> Vec<ProductCard> {
    products
        .into_iter()
        .map(|product| ProductCard {
            quantity: cart.quantity_of(product.id),
            product,
        })
        .collect()
}

/// Product listing template, shared by the home page and category pages.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductListTemplate {
    pub layout: Layout,
    pub heading: String,
    pub cards: Vec<ProductCard>,
    pub pager: Pager,
    pub return_to: String,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub card: ProductCard,
    pub return_to: String,
}

/// Display product detail page.
#[instrument(skip(state, layout, cart))]
pub async fn show(
    State(state): State<AppState>,
    layout: Layout,
    cart: SessionCart,
    Path(id): Path<ProductId>,
) -> Result<ProductShowTemplate> {
    let product = state.api().product(id).await?;
    let quantity = cart.snapshot().quantity_of(product.id);

    Ok(ProductShowTemplate {
        layout,
        card: ProductCard { product, quantity },
        return_to: format!("/product/{id}"),
    })
}
