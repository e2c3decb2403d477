//! Category route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use tracing::instrument;

use marigold_core::{CategoryId, Page};

use crate::api::Category;
use crate::error::Result;
use crate::filters;
use crate::middleware::SessionCart;
use crate::routes::layout::{Layout, PageQuery, Pager, page_href};
use crate::routes::products::{ProductListTemplate, cards};
use crate::state::AppState;

/// Products per category page.
pub const PRODUCTS_PER_PAGE: usize = 8;

/// Category listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub layout: Layout,
    pub categories: Vec<Category>,
}

/// Display all categories.
#[instrument(skip(state, layout))]
pub async fn index(State(state): State<AppState>, layout: Layout) -> Result<CategoriesIndexTemplate> {
    let categories = state.api().categories().await?;
    Ok(CategoriesIndexTemplate { layout, categories })
}

/// Display the products of one category.
#[instrument(skip(state, layout, cart))]
pub async fn show(
    State(state): State<AppState>,
    layout: Layout,
    cart: SessionCart,
    Path(id): Path<CategoryId>,
    Query(query): Query<PageQuery>,
) -> Result<ProductListTemplate> {
    let category = state.api().category(id).await?;
    let products = state.api().products_by_category(id).await?;

    let path = format!("/category/{id}");
    let page = Page::slice(products, query.page(), PRODUCTS_PER_PAGE);
    let pager = Pager::new(&page, page_href(&path, None));
    let return_to = format!("{}{}", pager.href, page.current_page);

    Ok(ProductListTemplate {
        layout,
        heading: category.name,
        cards: cards(page.items, cart.snapshot()),
        pager,
        return_to,
    })
}
