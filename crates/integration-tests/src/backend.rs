//! In-process stand-in for the catalog/order REST backend.
//!
//! Starts with two categories, three products and two known accounts.
//! Admin writes change the catalog in place, every accepted order is
//! recorded, and tests can make it reject orders or stop accepting the
//! tokens it handed out.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

/// Login for the administrator account.
pub const ADMIN_EMAIL: &str = "admin@marigold.test";
/// Login for the customer account.
pub const CUSTOMER_EMAIL: &str = "ada@marigold.test";
/// Password shared by both accounts.
pub const PASSWORD: &str = "correct-horse";

const ADMIN_TOKEN: &str = "admin-token";
const CUSTOMER_TOKEN: &str = "customer-token";

type Reply = (StatusCode, Json<Value>);
type Shared = Arc<Mutex<BackendState>>;

/// An image received by `product/create` or `product/update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub len: usize,
}

struct BackendState {
    categories: Vec<Value>,
    products: Vec<Value>,
    next_category_id: i64,
    next_product_id: i64,
    orders: Vec<Value>,
    item_statuses: HashMap<i64, String>,
    uploads: Vec<Upload>,
    reject_orders: bool,
    tokens_revoked: bool,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            categories: category_fixtures(),
            products: product_fixtures(),
            next_category_id: 3,
            next_product_id: 4,
            orders: Vec::new(),
            item_statuses: HashMap::new(),
            uploads: Vec::new(),
            reject_orders: false,
            tokens_revoked: false,
        }
    }
}

/// Handle on a running mock backend.
#[derive(Clone)]
pub struct MockBackend {
    addr: SocketAddr,
    state: Shared,
}

impl MockBackend {
    /// Bind an ephemeral port and start serving.
    pub async fn spawn() -> Self {
        let state = Arc::new(Mutex::new(BackendState::default()));

        let api = Router::new()
            .route("/auth/login", post(login))
            .route("/user/my-info", get(my_info))
            .route("/category/get-all", get(categories))
            .route("/category/get-category-by-id/{id}", get(category))
            .route("/category/create", post(create_category))
            .route("/category/update/{id}", put(update_category))
            .route("/category/delete/{id}", delete(delete_category))
            .route("/product/get-all", get(products))
            .route("/product/get-by-product-id/{id}", get(product))
            .route("/product/get-by-category-id/{id}", get(products_by_category))
            .route("/product/search", get(search))
            .route("/product/create", post(create_product))
            .route("/product/update", put(update_product))
            .route("/product/delete/{id}", delete(delete_product))
            .route("/order/create", post(create_order))
            .route("/order/filter", get(filter_orders))
            .route("/order/update-item-status/{id}", put(update_item_status))
            .with_state(Arc::clone(&state));
        let app = Router::new().nest("/api", api);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Mock backend has no address");
        tokio::spawn(crate::serve("mock backend", listener, app));

        Self { addr, state }
    }

    /// Base URL the storefront should be configured with.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}/api/", self.addr)).expect("Mock backend URL is valid")
    }

    /// Order bodies accepted so far, oldest first.
    #[must_use]
    pub fn placed_orders(&self) -> Vec<Value> {
        lock(&self.state).orders.clone()
    }

    /// Current status marker of an order item, if the item exists.
    #[must_use]
    pub fn item_status(&self, id: i64) -> Option<String> {
        let state = lock(&self.state);
        order_items(&state)
            .into_iter()
            .find(|item| item["id"] == json!(id))
            .and_then(|item| item["status"].as_str().map(ToString::to_string))
    }

    /// The category called `name`.
    #[must_use]
    pub fn category_named(&self, name: &str) -> Option<Value> {
        lock(&self.state)
            .categories
            .iter()
            .find(|category| category["name"] == json!(name))
            .cloned()
    }

    /// The product called `name`.
    #[must_use]
    pub fn product_named(&self, name: &str) -> Option<Value> {
        lock(&self.state)
            .products
            .iter()
            .find(|product| product["name"] == json!(name))
            .cloned()
    }

    /// Images received so far, oldest first.
    #[must_use]
    pub fn uploads(&self) -> Vec<Upload> {
        lock(&self.state).uploads.clone()
    }

    /// Make `order/create` fail with "Out of stock".
    pub fn reject_orders(&self, reject: bool) {
        lock(&self.state).reject_orders = reject;
    }

    /// Answer 401 to every authenticated call from now on.
    pub fn revoke_tokens(&self) {
        lock(&self.state).tokens_revoked = true;
    }
}

fn lock(state: &Mutex<BackendState>) -> MutexGuard<'_, BackendState> {
    state.lock().expect("Mock backend state poisoned")
}

// =============================================================================
// Fixtures
// =============================================================================

fn category_fixtures() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "Shirts"}),
        json!({"id": 2, "name": "Hats"}),
    ]
}

fn product_fixtures() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "Linen Shirt", "description": "Breathable linen",
               "price": "29.99", "imageUrl": "https://cdn.marigold.test/1.jpg", "categoryId": 1}),
        json!({"id": 2, "name": "Oxford Shirt", "description": "Button-down",
               "price": "45.00", "imageUrl": "https://cdn.marigold.test/2.jpg", "categoryId": 1}),
        json!({"id": 3, "name": "Straw Hat", "description": "Wide brim",
               "price": "18.50", "imageUrl": "https://cdn.marigold.test/3.jpg", "categoryId": 2}),
    ]
}

fn find_product(state: &BackendState, id: i64) -> Option<Value> {
    state
        .products
        .iter()
        .find(|product| product["id"] == json!(id))
        .cloned()
}

fn ok(mut body: Value) -> Reply {
    body["status"] = json!(200);
    (StatusCode::OK, Json(body))
}

fn fail(status: StatusCode, message: &str) -> Reply {
    (
        status,
        Json(json!({"status": status.as_u16(), "message": message})),
    )
}

/// Role marker for the bearer token, `None` when missing or revoked.
fn role_for(headers: &HeaderMap, state: &BackendState) -> Option<&'static str> {
    if state.tokens_revoked {
        return None;
    }
    let token = headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;
    match token {
        ADMIN_TOKEN => Some("ADMIN"),
        CUSTOMER_TOKEN => Some("USER"),
        _ => None,
    }
}

/// 401 for a missing or revoked token, 403 for a customer.
fn require_admin(headers: &HeaderMap, state: &BackendState) -> Result<(), Reply> {
    match role_for(headers, state) {
        Some("ADMIN") => Ok(()),
        Some(_) => Err(fail(StatusCode::FORBIDDEN, "Admins only")),
        None => Err(fail(StatusCode::UNAUTHORIZED, "Token expired")),
    }
}

/// Placed orders flattened into backend order items.
fn order_items(state: &BackendState) -> Vec<Value> {
    let mut items = Vec::new();
    for order in &state.orders {
        let Some(lines) = order["items"].as_array() else {
            continue;
        };
        for line in lines {
            let product_id = line["productId"].as_i64().unwrap_or_default();
            let Some(product) = find_product(state, product_id) else {
                continue;
            };
            let id = i64::try_from(items.len() + 1).unwrap_or(i64::MAX);
            let status = state
                .item_statuses
                .get(&id)
                .map_or("PENDING", String::as_str);
            items.push(json!({
                "id": id,
                "quantity": line["quantity"],
                "price": product["price"],
                "status": status,
                "createdAt": "2025-06-14T10:20:30",
                "product": product,
            }));
        }
    }
    items
}

// =============================================================================
// Accounts
// =============================================================================

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(Json(body): Json<LoginBody>) -> Reply {
    if body.password != PASSWORD {
        return fail(StatusCode::BAD_REQUEST, "Invalid credentials");
    }
    match body.email.as_str() {
        ADMIN_EMAIL => ok(json!({"token": ADMIN_TOKEN, "role": "ADMIN"})),
        CUSTOMER_EMAIL => ok(json!({"token": CUSTOMER_TOKEN, "role": "USER"})),
        _ => fail(StatusCode::NOT_FOUND, "Email not found"),
    }
}

async fn my_info(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let state = lock(&state);
    let Some(role) = role_for(&headers, &state) else {
        return fail(StatusCode::UNAUTHORIZED, "Token expired");
    };
    let (name, email) = if role == "ADMIN" {
        ("Grace Hopper", ADMIN_EMAIL)
    } else {
        ("Ada Lovelace", CUSTOMER_EMAIL)
    };
    ok(json!({"user": {
        "id": 1,
        "name": name,
        "email": email,
        "phoneNumber": "555-0100",
        "role": role,
        "orderItemList": order_items(&state),
    }}))
}

// =============================================================================
// Categories
// =============================================================================

#[derive(Deserialize)]
struct CategoryBody {
    name: String,
}

async fn categories(State(state): State<Shared>) -> Reply {
    ok(json!({"categoryList": lock(&state).categories}))
}

async fn category(State(state): State<Shared>, Path(id): Path<i64>) -> Reply {
    let state = lock(&state);
    match state.categories.iter().find(|c| c["id"] == json!(id)) {
        Some(category) => ok(json!({"category": category})),
        None => fail(StatusCode::NOT_FOUND, "Category Not Found"),
    }
}

async fn create_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<CategoryBody>,
) -> Reply {
    let mut state = lock(&state);
    if let Err(reply) = require_admin(&headers, &state) {
        return reply;
    }
    let id = state.next_category_id;
    state.next_category_id += 1;
    state.categories.push(json!({"id": id, "name": body.name}));
    ok(json!({"message": "Category created successfully"}))
}

async fn update_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<CategoryBody>,
) -> Reply {
    let mut state = lock(&state);
    if let Err(reply) = require_admin(&headers, &state) {
        return reply;
    }
    match state.categories.iter_mut().find(|c| c["id"] == json!(id)) {
        Some(category) => {
            category["name"] = json!(body.name);
            ok(json!({"message": "Category updated successfully"}))
        }
        None => fail(StatusCode::NOT_FOUND, "Category Not Found"),
    }
}

async fn delete_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    let mut state = lock(&state);
    if let Err(reply) = require_admin(&headers, &state) {
        return reply;
    }
    let before = state.categories.len();
    state.categories.retain(|c| c["id"] != json!(id));
    if state.categories.len() == before {
        return fail(StatusCode::NOT_FOUND, "Category Not Found");
    }
    ok(json!({"message": "Category deleted successfully"}))
}

// =============================================================================
// Products
// =============================================================================

async fn products(State(state): State<Shared>) -> Reply {
    ok(json!({"productList": lock(&state).products}))
}

async fn product(State(state): State<Shared>, Path(id): Path<i64>) -> Reply {
    match find_product(&lock(&state), id) {
        Some(product) => ok(json!({"product": product})),
        None => fail(StatusCode::NOT_FOUND, "Product Not Found"),
    }
}

async fn products_by_category(State(state): State<Shared>, Path(id): Path<i64>) -> Reply {
    let list: Vec<Value> = lock(&state)
        .products
        .iter()
        .filter(|product| product["categoryId"] == json!(id))
        .cloned()
        .collect();
    ok(json!({"productList": list}))
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(rename = "searchValue")]
    search_value: String,
}

async fn search(State(state): State<Shared>, Query(query): Query<SearchQuery>) -> Reply {
    let needle = query.search_value.to_lowercase();
    let list: Vec<Value> = lock(&state)
        .products
        .iter()
        .filter(|product| {
            product["name"]
                .as_str()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect();
    ok(json!({"productList": list}))
}

/// The text fields of a product multipart body, plus its image.
#[derive(Default)]
struct ProductParts {
    fields: HashMap<String, String>,
    image: Option<Upload>,
}

async fn read_product_parts(mut multipart: Multipart) -> Result<ProductParts, Reply> {
    let bad = |e: axum::extract::multipart::MultipartError| {
        fail(StatusCode::BAD_REQUEST, &format!("Bad multipart body: {e}"))
    };
    let mut parts = ProductParts::default();
    while let Some(field) = multipart.next_field().await.map_err(bad)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(bad)?;
            parts.image = Some(Upload {
                file_name,
                content_type,
                len: bytes.len(),
            });
        } else {
            let value = field.text().await.map_err(bad)?;
            parts.fields.insert(name, value);
        }
    }
    Ok(parts)
}

fn apply_product_fields(product: &mut Value, parts: &ProductParts) {
    for (field, key) in [
        ("name", "name"),
        ("description", "description"),
        ("price", "price"),
    ] {
        if let Some(value) = parts.fields.get(field) {
            product[key] = json!(value);
        }
    }
    if let Some(id) = parts
        .fields
        .get("categoryId")
        .and_then(|id| id.parse::<i64>().ok())
    {
        product["categoryId"] = json!(id);
    }
    if let Some(image) = &parts.image {
        product["imageUrl"] = json!(format!("https://cdn.marigold.test/{}", image.file_name));
    }
}

async fn create_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Reply {
    let allowed = require_admin(&headers, &lock(&state));
    if let Err(reply) = allowed {
        return reply;
    }
    let parts = match read_product_parts(multipart).await {
        Ok(parts) => parts,
        Err(reply) => return reply,
    };
    let Some(image) = parts.image.clone() else {
        return fail(StatusCode::BAD_REQUEST, "Image is required");
    };

    let mut state = lock(&state);
    let id = state.next_product_id;
    state.next_product_id += 1;
    let mut product = json!({"id": id});
    apply_product_fields(&mut product, &parts);
    state.products.push(product);
    state.uploads.push(image);
    ok(json!({"message": "Product created successfully"}))
}

async fn update_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Reply {
    let allowed = require_admin(&headers, &lock(&state));
    if let Err(reply) = allowed {
        return reply;
    }
    let parts = match read_product_parts(multipart).await {
        Ok(parts) => parts,
        Err(reply) => return reply,
    };
    let Some(id) = parts
        .fields
        .get("productId")
        .and_then(|id| id.parse::<i64>().ok())
    else {
        return fail(StatusCode::BAD_REQUEST, "productId is required");
    };

    let mut state = lock(&state);
    let Some(product) = state.products.iter_mut().find(|p| p["id"] == json!(id)) else {
        return fail(StatusCode::NOT_FOUND, "Product Not Found");
    };
    apply_product_fields(product, &parts);
    if let Some(image) = parts.image {
        state.uploads.push(image);
    }
    ok(json!({"message": "Product updated successfully"}))
}

async fn delete_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    let mut state = lock(&state);
    if let Err(reply) = require_admin(&headers, &state) {
        return reply;
    }
    let before = state.products.len();
    state.products.retain(|p| p["id"] != json!(id));
    if state.products.len() == before {
        return fail(StatusCode::NOT_FOUND, "Product Not Found");
    }
    ok(json!({"message": "Product deleted successfully"}))
}

// =============================================================================
// Orders
// =============================================================================

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(order): Json<Value>,
) -> Reply {
    let mut state = lock(&state);
    if role_for(&headers, &state).is_none() {
        return fail(StatusCode::UNAUTHORIZED, "Token expired");
    }
    if state.reject_orders {
        return fail(StatusCode::BAD_REQUEST, "Out of stock");
    }
    state.orders.push(order);
    ok(json!({"message": "Order was successfully placed"}))
}

#[derive(Deserialize)]
struct FilterQuery {
    status: Option<String>,
}

async fn filter_orders(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<FilterQuery>,
) -> Reply {
    let state = lock(&state);
    if let Err(reply) = require_admin(&headers, &state) {
        return reply;
    }
    let items: Vec<Value> = order_items(&state)
        .into_iter()
        .filter(|item| {
            query
                .status
                .as_deref()
                .is_none_or(|status| item["status"] == json!(status))
        })
        .collect();
    ok(json!({"orderItemList": items}))
}

#[derive(Deserialize)]
struct StatusQuery {
    status: String,
}

async fn update_item_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Query(query): Query<StatusQuery>,
) -> Reply {
    let mut state = lock(&state);
    if let Err(reply) = require_admin(&headers, &state) {
        return reply;
    }
    if !order_items(&state).iter().any(|item| item["id"] == json!(id)) {
        return fail(StatusCode::NOT_FOUND, "Order item not found");
    }
    state.item_statuses.insert(id, query.status.to_uppercase());
    ok(json!({"message": "Order status updated successfully"}))
}
