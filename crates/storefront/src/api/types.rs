//! Request and response types for the catalog/order REST backend.
//!
//! The backend wraps every answer in one envelope ([`ApiResponse`]) and
//! leaves out fields that do not apply. Field names on the wire are
//! camelCase.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use marigold_core::{
    AddressId, CartProduct, CategoryId, OrderItemId, OrderStatus, Price, ProductId, UserId,
};

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiResponse {
    pub status: u16,
    pub message: Option<String>,
    pub token: Option<String>,
    pub role: Option<String>,
    pub user: Option<User>,
    pub category: Option<Category>,
    pub category_list: Vec<Category>,
    pub product: Option<Product>,
    pub product_list: Vec<Product>,
    pub order_item_list: Vec<OrderItem>,
}

// =============================================================================
// Catalog
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

impl Product {
    /// The cart payload for this product.
    #[must_use]
    pub fn to_cart_product(&self) -> CartProduct {
        CartProduct {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            image_url: self.image_url.clone().unwrap_or_default(),
        }
    }
}

// =============================================================================
// Users and Orders
// =============================================================================

/// The signed-in user with address and order history.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub role: Option<String>,
    pub address: Option<Address>,
    pub order_item_list: Vec<OrderItem>,
}

/// A postal address. Also the body of the save-address request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<AddressId>,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// One product line of a placed order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub quantity: u32,
    pub price: Price,
    pub status: OrderStatus,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl OrderItem {
    /// Order date as `YYYY-MM-DD`, empty when the backend sent none.
    #[must_use]
    pub fn ordered_on(&self) -> String {
        self.created_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn product_name(&self) -> &str {
        self.product.as_ref().map_or("", |product| product.name.as_str())
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Login request body.
///
/// The password is only exposed while serializing the body.
#[derive(Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

impl Serialize for LoginRequest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("LoginRequest", 2)?;
        state.serialize_field("email", &self.email)?;
        state.serialize_field("password", self.password.expose_secret())?;
        state.end()
    }
}

/// Registration request body.
#[derive(Debug)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub password: SecretString,
}

impl Serialize for RegisterRequest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("RegisterRequest", 4)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("email", &self.email)?;
        state.serialize_field("phoneNumber", &self.phone_number)?;
        state.serialize_field("password", self.password.expose_secret())?;
        state.end()
    }
}

/// Create/update category request body.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRequest {
    pub name: String,
}

/// An uploaded product image.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Create/update product form, sent as multipart.
///
/// `product_id` is set for updates; `image` may be omitted on update to keep
/// the current image.
#[derive(Debug, Clone)]
pub struct ProductForm {
    pub product_id: Option<ProductId>,
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image: Option<ImageUpload>,
}

/// Filter for the order item listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub item_id: Option<OrderItemId>,
}
