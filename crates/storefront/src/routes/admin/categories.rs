//! Admin category management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use marigold_core::CategoryId;

use crate::api::Category;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::admin::write_failed;
use crate::routes::layout::{Layout, redirect_error, redirect_success};
use crate::state::AppState;

const CATEGORIES_PATH: &str = "/admin/categories";

/// Category form data.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: String,
}

/// Category table template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/categories/index.html")]
pub struct CategoriesTemplate {
    pub layout: Layout,
    pub categories: Vec<Category>,
}

/// Add/edit category form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/categories/form.html")]
pub struct CategoryFormTemplate {
    pub layout: Layout,
    pub heading: &'static str,
    pub action: String,
    pub name: String,
}

/// Display all categories.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_credential): RequireAdmin,
    layout: Layout,
) -> Result<CategoriesTemplate> {
    let categories = state.api().categories().await?;
    Ok(CategoriesTemplate { layout, categories })
}

/// Display the empty category form.
pub async fn new_page(RequireAdmin(_credential): RequireAdmin, layout: Layout) -> CategoryFormTemplate {
    CategoryFormTemplate {
        layout,
        heading: "Add Category",
        action: CATEGORIES_PATH.to_string(),
        name: String::new(),
    }
}

/// Display the form for an existing category.
#[instrument(skip(state, _credential, layout))]
pub async fn edit_page(
    State(state): State<AppState>,
    RequireAdmin(_credential): RequireAdmin,
    layout: Layout,
    Path(id): Path<CategoryId>,
) -> Result<CategoryFormTemplate> {
    let category = state.api().category(id).await?;
    Ok(CategoryFormTemplate {
        layout,
        heading: "Edit Category",
        action: format!("{CATEGORIES_PATH}/{id}"),
        name: category.name,
    })
}

/// Create a category.
#[instrument(skip(state, credential))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(credential): RequireAdmin,
    Form(form): Form<CategoryForm>,
) -> Response {
    let name = form.name.trim();
    if name.is_empty() {
        return redirect_error("/admin/add-category", "Category name is required").into_response();
    }

    match state.api().create_category(&credential, name).await {
        Ok(message) => {
            add_breadcrumb("admin", "Created category", Some(&[("name", name)]));
            redirect_success(CATEGORIES_PATH, &message).into_response()
        }
        Err(e) => write_failed("/admin/add-category", "Creating category", &e),
    }
}

/// Rename a category.
#[instrument(skip(state, credential))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(credential): RequireAdmin,
    Path(id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let edit_path = format!("/admin/edit-category/{id}");
    let name = form.name.trim();
    if name.is_empty() {
        return redirect_error(&edit_path, "Category name is required").into_response();
    }

    match state.api().update_category(&credential, id, name).await {
        Ok(message) => redirect_success(CATEGORIES_PATH, &message).into_response(),
        Err(e) => write_failed(&edit_path, "Updating category", &e),
    }
}

/// Delete a category.
#[instrument(skip(state, credential))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(credential): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Response {
    match state.api().delete_category(&credential, id).await {
        Ok(message) => redirect_success(CATEGORIES_PATH, &message).into_response(),
        Err(e) => write_failed(CATEGORIES_PATH, "Deleting category", &e),
    }
}
