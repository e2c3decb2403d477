//! Client for the catalog/order REST backend.
//!
//! # Architecture
//!
//! - The backend is the source of truth for catalog, users and orders
//! - Every call is a JSON request answered by the [`ApiResponse`] envelope
//! - Authenticated calls carry the session credential as a bearer token
//! - Catalog reads are cached in-process via `moka`; admin writes to the
//!   catalog clear the cache
//!
//! # Example
//!
//! ```rust,ignore
//! use marigold_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api)?;
//!
//! let categories = client.categories().await?;
//! let credential = client.login("ada@example.com", &password).await?;
//! client.place_order(&credential, &cart.to_order_request()).await?;
//! ```

mod cache;
pub mod types;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode, multipart};
use secrecy::SecretString;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use marigold_core::{
    CategoryId, Credential, OrderItemId, OrderRequest, OrderStatus, ProductId,
};

use crate::config::ApiConfig;

use cache::{CacheKey, CacheValue};
pub use types::*;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend rejected the credential.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The backend answered with a non-success status.
    #[error("Backend returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// A successful response lacked a field the call depends on.
    #[error("Response missing field: {0}")]
    MissingField(&'static str),
}

impl ApiError {
    /// Message suitable for showing to the user.
    ///
    /// Backend validation messages are passed through; transport and decode
    /// failures get a generic message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } | Self::Unauthorized(message) | Self::NotFound(message) => {
                message.clone()
            }
            _ => "The store is unavailable right now, please try again".to_string(),
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the REST backend.
///
/// Cheap to clone; all clones share one connection pool and one cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner.client.request(method, url)
    }

    fn authed(&self, method: Method, url: Url, credential: &Credential) -> RequestBuilder {
        self.request(method, url).bearer_auth(credential.token())
    }

    /// Send a request and decode the envelope.
    async fn send(&self, request: RequestBuilder) -> Result<ApiResponse, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiResponse>(&body)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());

            tracing::warn!(
                status = %status,
                message = %message,
                "Backend returned non-success status"
            );

            return Err(match status {
                StatusCode::NOT_FOUND => ApiError::NotFound(message),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ApiError::Unauthorized(message)
                }
                _ => ApiError::Status { status, message },
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    fn message_or(response: ApiResponse, fallback: &str) -> String {
        response.message.unwrap_or_else(|| fallback.to_string())
    }

    // =========================================================================
    // Auth and Users
    // =========================================================================

    /// Exchange email and password for a credential.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Credential, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.clone(),
        };
        let response = self
            .send(self.request(Method::POST, self.url("auth/login")?).json(&body))
            .await?;

        let token = response.token.ok_or(ApiError::MissingField("token"))?;
        let role = response.role.unwrap_or_default();
        Ok(Credential::new(token, role))
    }

    /// Create a customer account.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<String, ApiError> {
        let response = self
            .send(self.request(Method::POST, self.url("auth/register")?).json(request))
            .await?;
        Ok(Self::message_or(response, "Registration successful"))
    }

    /// The signed-in user, address and order history.
    #[instrument(skip_all)]
    pub async fn my_info(&self, credential: &Credential) -> Result<User, ApiError> {
        let response = self
            .send(self.authed(Method::GET, self.url("user/my-info")?, credential))
            .await?;
        response.user.ok_or(ApiError::MissingField("user"))
    }

    /// Create or replace the signed-in user's address.
    #[instrument(skip_all)]
    pub async fn save_address(
        &self,
        credential: &Credential,
        address: &Address,
    ) -> Result<String, ApiError> {
        let response = self
            .send(
                self.authed(Method::POST, self.url("address/save")?, credential)
                    .json(address),
            )
            .await?;
        Ok(Self::message_or(response, "Address saved"))
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// All categories.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let response = self
            .send(self.request(Method::GET, self.url("category/get-all")?))
            .await?;
        let categories = response.category_list;

        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// One category.
    #[instrument(skip(self))]
    pub async fn category(&self, id: CategoryId) -> Result<Category, ApiError> {
        let key = CacheKey::Category(id);
        if let Some(CacheValue::Category(category)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for category");
            return Ok(category);
        }

        let response = self
            .send(self.request(
                Method::GET,
                self.url(&format!("category/get-category-by-id/{id}"))?,
            ))
            .await?;
        let category = response
            .category
            .ok_or_else(|| ApiError::NotFound(format!("Category not found: {id}")))?;

        self.inner
            .cache
            .insert(key, CacheValue::Category(category.clone()))
            .await;

        Ok(category)
    }

    /// Create a category.
    #[instrument(skip(self, credential))]
    pub async fn create_category(
        &self,
        credential: &Credential,
        name: &str,
    ) -> Result<String, ApiError> {
        let body = CategoryRequest {
            name: name.to_string(),
        };
        let response = self
            .send(
                self.authed(Method::POST, self.url("category/create")?, credential)
                    .json(&body),
            )
            .await?;
        self.invalidate_catalog();
        Ok(Self::message_or(response, "Category created"))
    }

    /// Rename a category.
    #[instrument(skip(self, credential))]
    pub async fn update_category(
        &self,
        credential: &Credential,
        id: CategoryId,
        name: &str,
    ) -> Result<String, ApiError> {
        let body = CategoryRequest {
            name: name.to_string(),
        };
        let response = self
            .send(
                self.authed(
                    Method::PUT,
                    self.url(&format!("category/update/{id}"))?,
                    credential,
                )
                .json(&body),
            )
            .await?;
        self.invalidate_catalog();
        Ok(Self::message_or(response, "Category updated"))
    }

    /// Delete a category.
    #[instrument(skip(self, credential))]
    pub async fn delete_category(
        &self,
        credential: &Credential,
        id: CategoryId,
    ) -> Result<String, ApiError> {
        let response = self
            .send(self.authed(
                Method::DELETE,
                self.url(&format!("category/delete/{id}"))?,
                credential,
            ))
            .await?;
        self.invalidate_catalog();
        Ok(Self::message_or(response, "Category deleted"))
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// All products.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        self.cached_product_list(CacheKey::Products, "product/get-all")
            .await
    }

    /// Products in one category.
    #[instrument(skip(self))]
    pub async fn products_by_category(&self, id: CategoryId) -> Result<Vec<Product>, ApiError> {
        self.cached_product_list(
            CacheKey::ProductsByCategory(id),
            &format!("product/get-by-category-id/{id}"),
        )
        .await
    }

    async fn cached_product_list(
        &self,
        key: CacheKey,
        path: &str,
    ) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let response = self
            .send(self.request(Method::GET, self.url(path)?))
            .await?;
        let products = response.product_list;

        self.inner
            .cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// One product.
    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let response = self
            .send(self.request(
                Method::GET,
                self.url(&format!("product/get-by-product-id/{id}"))?,
            ))
            .await?;
        let product = response
            .product
            .ok_or_else(|| ApiError::NotFound(format!("Product not found: {id}")))?;

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Full-text product search. Not cached.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let mut url = self.url("product/search")?;
        url.query_pairs_mut().append_pair("searchValue", query);
        let response = self.send(self.request(Method::GET, url)).await?;
        Ok(response.product_list)
    }

    /// Create a product (`product_id` is ignored).
    #[instrument(skip(self, credential, form), fields(name = %form.name))]
    pub async fn create_product(
        &self,
        credential: &Credential,
        form: ProductForm,
    ) -> Result<String, ApiError> {
        let body = Self::product_multipart(form)?;
        let response = self
            .send(
                self.authed(Method::POST, self.url("product/create")?, credential)
                    .multipart(body),
            )
            .await?;
        self.invalidate_catalog();
        Ok(Self::message_or(response, "Product created"))
    }

    /// Update a product. The form must carry `product_id`.
    #[instrument(skip(self, credential, form), fields(product_id = ?form.product_id))]
    pub async fn update_product(
        &self,
        credential: &Credential,
        form: ProductForm,
    ) -> Result<String, ApiError> {
        if form.product_id.is_none() {
            return Err(ApiError::MissingField("productId"));
        }
        let body = Self::product_multipart(form)?;
        let response = self
            .send(
                self.authed(Method::PUT, self.url("product/update")?, credential)
                    .multipart(body),
            )
            .await?;
        self.invalidate_catalog();
        Ok(Self::message_or(response, "Product updated"))
    }

    /// Delete a product.
    #[instrument(skip(self, credential))]
    pub async fn delete_product(
        &self,
        credential: &Credential,
        id: ProductId,
    ) -> Result<String, ApiError> {
        let response = self
            .send(self.authed(
                Method::DELETE,
                self.url(&format!("product/delete/{id}"))?,
                credential,
            ))
            .await?;
        self.invalidate_catalog();
        Ok(Self::message_or(response, "Product deleted"))
    }

    fn product_multipart(form: ProductForm) -> Result<multipart::Form, ApiError> {
        let mut body = multipart::Form::new()
            .text("categoryId", form.category_id.to_string())
            .text("name", form.name)
            .text("description", form.description)
            .text("price", form.price.to_string());

        if let Some(id) = form.product_id {
            body = body.text("productId", id.to_string());
        }

        if let Some(image) = form.image {
            let part = multipart::Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.content_type)?;
            body = body.part("image", part);
        }

        Ok(body)
    }

    /// Drop every cached catalog read.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order for the signed-in user.
    #[instrument(skip(self, credential, order), fields(items = order.items.len()))]
    pub async fn place_order(
        &self,
        credential: &Credential,
        order: &OrderRequest,
    ) -> Result<String, ApiError> {
        let response = self
            .send(
                self.authed(Method::POST, self.url("order/create")?, credential)
                    .json(order),
            )
            .await?;
        Ok(Self::message_or(response, "Order was successfully placed"))
    }

    /// Order items, optionally filtered by status or id.
    #[instrument(skip(self, credential))]
    pub async fn order_items(
        &self,
        credential: &Credential,
        filter: OrderFilter,
    ) -> Result<Vec<OrderItem>, ApiError> {
        let mut url = self.url("order/filter")?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(status) = filter.status {
                pairs.append_pair("status", status.as_str());
            }
            if let Some(item_id) = filter.item_id {
                pairs.append_pair("itemId", &item_id.to_string());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        let response = self.send(self.authed(Method::GET, url, credential)).await?;
        Ok(response.order_item_list)
    }

    /// One order item.
    #[instrument(skip(self, credential))]
    pub async fn order_item(
        &self,
        credential: &Credential,
        id: OrderItemId,
    ) -> Result<OrderItem, ApiError> {
        let filter = OrderFilter {
            status: None,
            item_id: Some(id),
        };
        self.order_items(credential, filter)
            .await?
            .into_iter()
            .find(|item| item.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("Order item not found: {id}")))
    }

    /// Move an order item to `status`.
    #[instrument(skip(self, credential))]
    pub async fn update_order_item_status(
        &self,
        credential: &Credential,
        id: OrderItemId,
        status: OrderStatus,
    ) -> Result<String, ApiError> {
        let mut url = self.url(&format!("order/update-item-status/{id}"))?;
        url.query_pairs_mut().append_pair("status", status.as_str());
        let response = self.send(self.authed(Method::PUT, url, credential)).await?;
        Ok(Self::message_or(response, "Order status updated successfully"))
    }
}
