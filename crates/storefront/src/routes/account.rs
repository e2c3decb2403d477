//! Account route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use marigold_core::{Credential, Page};

use crate::api::{Address, ApiError, OrderItem, User};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAuth, expire_credential};
use crate::routes::layout::{Layout, PageQuery, Pager, page_href, redirect_error, redirect_success};
use crate::state::AppState;

/// Orders per profile page.
pub const ORDERS_PER_PAGE: usize = 5;

const PROFILE_PATH: &str = "/profile";

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub layout: Layout,
    pub user: User,
    pub orders: Vec<OrderItem>,
    pub pager: Pager,
}

/// Address form template.
#[derive(Template, WebTemplate)]
#[template(path = "account/address.html")]
pub struct AddressTemplate {
    pub layout: Layout,
    pub heading: &'static str,
    pub address: Address,
}

/// Display the profile with the order history.
#[instrument(skip(state, session, credential, layout))]
pub async fn profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(credential): RequireAuth,
    layout: Layout,
    Query(query): Query<PageQuery>,
) -> Response {
    let mut user = match fetch_user(&state, &session, &credential, PROFILE_PATH).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let history = std::mem::take(&mut user.order_item_list);
    let page = Page::slice(history, query.page(), ORDERS_PER_PAGE);
    let pager = Pager::new(&page, page_href(PROFILE_PATH, None));

    ProfileTemplate {
        layout,
        user,
        orders: page.items,
        pager,
    }
    .into_response()
}

/// Display the empty address form.
#[instrument(skip_all)]
pub async fn add_address_page(RequireAuth(_credential): RequireAuth, layout: Layout) -> AddressTemplate {
    AddressTemplate {
        layout,
        heading: "Add Address",
        address: Address::default(),
    }
}

/// Display the address form prefilled with the saved address.
#[instrument(skip_all)]
pub async fn edit_address_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(credential): RequireAuth,
    layout: Layout,
) -> Response {
    let user = match fetch_user(&state, &session, &credential, "/edit-address").await {
        Ok(user) => user,
        Err(response) => return response,
    };

    AddressTemplate {
        layout,
        heading: "Edit Address",
        address: user.address.unwrap_or_default(),
    }
    .into_response()
}

/// Create or replace the user's address.
#[instrument(skip_all)]
pub async fn save_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(credential): RequireAuth,
    Form(address): Form<Address>,
) -> Response {
    if [
        &address.street,
        &address.city,
        &address.state,
        &address.zip_code,
        &address.country,
    ]
    .iter()
    .any(|field| field.trim().is_empty())
    {
        return redirect_error("/edit-address", "All address fields are required").into_response();
    }

    match state.api().save_address(&credential, &address).await {
        Ok(message) => redirect_success(PROFILE_PATH, &message).into_response(),
        Err(ApiError::Unauthorized(_)) => expire_credential(&session, "/edit-address")
            .await
            .into_response(),
        Err(e) => {
            tracing::warn!("Saving address failed: {}", e);
            redirect_error("/edit-address", &e.user_message()).into_response()
        }
    }
}

/// Load the signed-in user. A rejected credential is dropped and the
/// client is sent to log in again, continuing to `requested`.
async fn fetch_user(
    state: &AppState,
    session: &Session,
    credential: &Credential,
    requested: &str,
) -> Result<User, Response> {
    match state.api().my_info(credential).await {
        Ok(user) => Ok(user),
        Err(ApiError::Unauthorized(_)) => {
            Err(expire_credential(session, requested).await.into_response())
        }
        Err(e) => Err(AppError::from(e).into_response()),
    }
}
