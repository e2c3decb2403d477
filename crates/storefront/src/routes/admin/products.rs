//! Admin product management.
//!
//! Create and update forms are `multipart/form-data` so an image can be
//! uploaded; the fields are forwarded to the backend as multipart as well.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use tracing::instrument;

use marigold_core::{CategoryId, Page, Price, ProductId};

use crate::api::{Category, ImageUpload, Product, ProductForm};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::admin::write_failed;
use crate::routes::layout::{Layout, PageQuery, Pager, page_href, redirect_error, redirect_success};
use crate::state::AppState;

/// Products per admin page.
pub const PRODUCTS_PER_PAGE: usize = 10;

const PRODUCTS_PATH: &str = "/admin/products";

/// A category in the product form's select box.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub id: CategoryId,
    pub name: String,
    pub selected: bool,
}

fn category_options(categories: Vec<Category>, selected: Option<CategoryId>) -> Vec<CategoryOption> {
    categories
        .into_iter()
        .map(|category| CategoryOption {
            selected: Some(category.id) == selected,
            id: category.id,
            name: category.name,
        })
        .collect()
}

/// Product table template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/index.html")]
pub struct ProductsTemplate {
    pub layout: Layout,
    pub products: Vec<Product>,
    pub pager: Pager,
}

/// Add/edit product form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/form.html")]
pub struct ProductFormTemplate {
    pub layout: Layout,
    pub heading: &'static str,
    pub action: String,
    pub categories: Vec<CategoryOption>,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: Option<String>,
    pub image_required: bool,
}

/// Display the product table.
#[instrument(skip(state, _credential, layout))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_credential): RequireAdmin,
    layout: Layout,
    Query(query): Query<PageQuery>,
) -> Result<ProductsTemplate> {
    let products = state.api().products().await?;
    let page = Page::slice(products, query.page(), PRODUCTS_PER_PAGE);
    let pager = Pager::new(&page, page_href(PRODUCTS_PATH, None));

    Ok(ProductsTemplate {
        layout,
        products: page.items,
        pager,
    })
}

/// Display the empty product form.
#[instrument(skip_all)]
pub async fn new_page(
    State(state): State<AppState>,
    RequireAdmin(_credential): RequireAdmin,
    layout: Layout,
) -> Result<ProductFormTemplate> {
    let categories = state.api().categories().await?;

    Ok(ProductFormTemplate {
        layout,
        heading: "Add Product",
        action: PRODUCTS_PATH.to_string(),
        categories: category_options(categories, None),
        name: String::new(),
        description: String::new(),
        price: String::new(),
        image_url: None,
        image_required: true,
    })
}

/// Display the form for an existing product.
#[instrument(skip(state, _credential, layout))]
pub async fn edit_page(
    State(state): State<AppState>,
    RequireAdmin(_credential): RequireAdmin,
    layout: Layout,
    Path(id): Path<ProductId>,
) -> Result<ProductFormTemplate> {
    let product = state.api().product(id).await?;
    let categories = state.api().categories().await?;

    Ok(ProductFormTemplate {
        layout,
        heading: "Edit Product",
        action: format!("{PRODUCTS_PATH}/{id}"),
        categories: category_options(categories, product.category_id),
        name: product.name,
        description: product.description.unwrap_or_default(),
        price: product.price.amount().to_string(),
        image_url: product.image_url,
        image_required: false,
    })
}

/// Create a product.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(credential): RequireAdmin,
    multipart: Multipart,
) -> Response {
    let back = "/admin/add-product";
    let form = match read_product_form(multipart, None).await {
        Ok(form) if form.image.is_none() => {
            return redirect_error(back, "Product image is required").into_response();
        }
        Ok(form) => form,
        Err(message) => return redirect_error(back, &message).into_response(),
    };

    match state.api().create_product(&credential, form).await {
        Ok(message) => redirect_success(PRODUCTS_PATH, &message).into_response(),
        Err(e) => write_failed(back, "Creating product", &e),
    }
}

/// Update a product. Leaving the image empty keeps the current one.
#[instrument(skip(state, credential, multipart))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(credential): RequireAdmin,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Response {
    let back = format!("/admin/edit-product/{id}");
    let form = match read_product_form(multipart, Some(id)).await {
        Ok(form) => form,
        Err(message) => return redirect_error(&back, &message).into_response(),
    };

    match state.api().update_product(&credential, form).await {
        Ok(message) => redirect_success(PRODUCTS_PATH, &message).into_response(),
        Err(e) => write_failed(&back, "Updating product", &e),
    }
}

/// Delete a product.
#[instrument(skip(state, credential))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(credential): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Response {
    match state.api().delete_product(&credential, id).await {
        Ok(message) => redirect_success(PRODUCTS_PATH, &message).into_response(),
        Err(e) => write_failed(PRODUCTS_PATH, "Deleting product", &e),
    }
}

// =============================================================================
// Multipart Parsing
// =============================================================================

#[derive(Default)]
struct RawProductFields {
    category_id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    price: Option<String>,
    image: Option<ImageUpload>,
}

/// Read the product form fields. Errors are messages for the admin.
async fn read_product_form(
    mut multipart: Multipart,
    product_id: Option<ProductId>,
) -> std::result::Result<ProductForm, String> {
    let mut raw = RawProductFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Invalid form submission: {e}"))?
    {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };

        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| format!("Unable to read image: {e}"))?;
            if !file_name.is_empty() && !bytes.is_empty() {
                raw.image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| format!("Invalid form submission: {e}"))?;
        match name.as_str() {
            "category_id" => raw.category_id = Some(value),
            "name" => raw.name = Some(value),
            "description" => raw.description = Some(value),
            "price" => raw.price = Some(value),
            _ => {}
        }
    }

    validate_product_fields(raw, product_id)
}

fn validate_product_fields(
    raw: RawProductFields,
    product_id: Option<ProductId>,
) -> std::result::Result<ProductForm, String> {
    let category_id = raw
        .category_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or("Please select a category")?
        .parse::<CategoryId>()
        .map_err(|_| "Please select a category".to_string())?;

    let name = raw
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or("Product name is required")?;

    let price = raw
        .price
        .as_deref()
        .map(str::trim)
        .and_then(|p| Decimal::from_str(p).ok())
        .ok_or("Price must be a number")?;
    Price::new(price).map_err(|e| e.to_string())?;

    Ok(ProductForm {
        product_id,
        category_id,
        name,
        description: raw.description.unwrap_or_default().trim().to_string(),
        price,
        image: raw.image,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn raw(price: &str) -> RawProductFields {
        RawProductFields {
            category_id: Some("2".to_string()),
            name: Some(" Linen Shirt ".to_string()),
            description: Some("Breathable".to_string()),
            price: Some(price.to_string()),
            image: None,
        }
    }

    #[test]
    fn test_valid_fields_become_form() {
        let form = validate_product_fields(raw("29.99"), Some(ProductId::new(4))).unwrap();
        assert_eq!(form.category_id, CategoryId::new(2));
        assert_eq!(form.name, "Linen Shirt");
        assert_eq!(form.price, Decimal::new(2999, 2));
        assert_eq!(form.product_id, Some(ProductId::new(4)));
    }

    #[test]
    fn test_bad_price_is_rejected() {
        assert!(validate_product_fields(raw("cheap"), None).is_err());
        assert!(validate_product_fields(raw("-1"), None).is_err());
    }

    #[test]
    fn test_missing_category_is_rejected() {
        let mut fields = raw("10");
        fields.category_id = Some(String::new());
        assert_eq!(
            validate_product_fields(fields, None).unwrap_err(),
            "Please select a category"
        );
    }

    #[test]
    fn test_category_options_mark_selection() {
        let categories = vec![
            Category {
                id: CategoryId::new(1),
                name: "Shirts".to_string(),
            },
            Category {
                id: CategoryId::new(2),
                name: "Hats".to_string(),
            },
        ];
        let options = category_options(categories, Some(CategoryId::new(2)));
        let selected: Vec<bool> = options.iter().map(|o| o.selected).collect();
        assert_eq!(selected, vec![false, true]);
    }
}
