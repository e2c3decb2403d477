//! Home page: the full catalog, or search results.

use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use marigold_core::Page;

use crate::error::Result;
use crate::middleware::SessionCart;
use crate::routes::layout::{Layout, Pager, page_href};
use crate::routes::products::{ProductListTemplate, cards};
use crate::state::AppState;

/// Products per home page.
pub const PRODUCTS_PER_PAGE: usize = 8;

/// Home page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub search: Option<String>,
    pub page: Option<usize>,
}

/// Display the product listing, filtered by `?search=` when present.
#[instrument(skip(state, layout, cart))]
pub async fn home(
    State(state): State<AppState>,
    layout: Layout,
    cart: SessionCart,
    Query(query): Query<HomeQuery>,
) -> Result<ProductListTemplate> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let (heading, products) = match search {
        Some(term) => (
            format!("Results for \"{term}\""),
            state.api().search_products(term).await?,
        ),
        None => ("Products".to_string(), state.api().products().await?),
    };

    let page = Page::slice(products, query.page.unwrap_or(1), PRODUCTS_PER_PAGE);
    let pager = Pager::new(&page, page_href("/", search));
    let return_to = format!("{}{}", pager.href, page.current_page);

    Ok(ProductListTemplate {
        layout,
        heading,
        cards: cards(page.items, cart.snapshot()),
        pager,
        return_to,
    })
}
