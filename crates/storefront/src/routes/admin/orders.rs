//! Admin order item management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use marigold_core::{OrderItemId, OrderStatus, Page};

use crate::api::{OrderFilter, OrderItem};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::admin::write_failed;
use crate::routes::layout::{Layout, Pager, redirect_error, redirect_success};
use crate::state::AppState;

/// Order items per admin page.
pub const ORDERS_PER_PAGE: usize = 10;

const ORDERS_PATH: &str = "/admin/orders";

/// `?status=&page=` on the order table.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
    pub page: Option<usize>,
}

/// Status change form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// An entry in a status select box.
#[derive(Debug, Clone, Copy)]
pub struct StatusOption {
    pub value: &'static str,
    pub selected: bool,
}

fn status_options(selected: Option<OrderStatus>) -> Vec<StatusOption> {
    OrderStatus::ALL
        .iter()
        .map(|status| StatusOption {
            value: status.as_str(),
            selected: Some(*status) == selected,
        })
        .collect()
}

/// Parse an optional status filter; blank means "all".
fn parse_status_filter(raw: Option<&str>) -> std::result::Result<Option<OrderStatus>, String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw.parse::<OrderStatus>().map(Some).map_err(|e| e.to_string()),
        None => Ok(None),
    }
}

/// Order table template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders/index.html")]
pub struct OrdersTemplate {
    pub layout: Layout,
    pub items: Vec<OrderItem>,
    pub statuses: Vec<StatusOption>,
    pub pager: Pager,
}

/// Order item detail template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders/show.html")]
pub struct OrderDetailTemplate {
    pub layout: Layout,
    pub item: OrderItem,
    pub statuses: Vec<StatusOption>,
}

/// Display order items, optionally filtered by status.
#[instrument(skip(state, credential, layout))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(credential): RequireAdmin,
    layout: Layout,
    Query(query): Query<OrdersQuery>,
) -> Result<OrdersTemplate> {
    let status = parse_status_filter(query.status.as_deref()).map_err(AppError::BadRequest)?;

    let filter = OrderFilter {
        status,
        item_id: None,
    };
    let items = state.api().order_items(&credential, filter).await?;

    let page = Page::slice(items, query.page.unwrap_or(1), ORDERS_PER_PAGE);
    let href = match status {
        Some(status) => format!("{ORDERS_PATH}?status={status}&page="),
        None => format!("{ORDERS_PATH}?page="),
    };
    let pager = Pager::new(&page, href);

    Ok(OrdersTemplate {
        layout,
        items: page.items,
        statuses: status_options(status),
        pager,
    })
}

/// Display one order item with its customer and product.
#[instrument(skip(state, credential, layout))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(credential): RequireAdmin,
    layout: Layout,
    Path(id): Path<OrderItemId>,
) -> Result<OrderDetailTemplate> {
    let item = state.api().order_item(&credential, id).await?;

    Ok(OrderDetailTemplate {
        layout,
        statuses: status_options(Some(item.status)),
        item,
    })
}

/// Move an order item to a new status.
#[instrument(skip(state, credential))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(credential): RequireAdmin,
    Path(id): Path<OrderItemId>,
    Form(form): Form<StatusForm>,
) -> Response {
    let back = format!("/admin/order-details/{id}");

    let status = match form.status.trim().parse::<OrderStatus>() {
        Ok(status) => status,
        Err(e) => return redirect_error(&back, &e.to_string()).into_response(),
    };

    match state
        .api()
        .update_order_item_status(&credential, id, status)
        .await
    {
        Ok(message) => {
            tracing::info!(order_item_id = %id, status = %status, "Order item status updated");
            redirect_success(&back, &message).into_response()
        }
        Err(e) => write_failed(&back, "Updating order item status", &e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_status_filter_means_all() {
        assert_eq!(parse_status_filter(None).unwrap(), None);
        assert_eq!(parse_status_filter(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("shipped")).unwrap(),
            Some(OrderStatus::Shipped)
        );
        assert!(parse_status_filter(Some("LOST")).is_err());
    }

    #[test]
    fn test_status_options_cover_every_status_once() {
        let options = status_options(Some(OrderStatus::Delivered));
        assert_eq!(options.len(), OrderStatus::ALL.len());
        let selected: Vec<_> = options.iter().filter(|o| o.selected).map(|o| o.value).collect();
        assert_eq!(selected, vec!["DELIVERED"]);
    }
}
