//! Admin writes reach the backend, and what they change shows up on the
//! next page view.

use reqwest::multipart::{Form, Part};

use marigold_integration_tests::{ADMIN_EMAIL, CUSTOMER_EMAIL, TestContext, Upload, location};

async fn admin() -> TestContext {
    let ctx = TestContext::new().await;
    ctx.login(ADMIN_EMAIL, None).await;
    ctx
}

fn product_form(name: &str, price: &str, image: Option<&str>) -> Form {
    let form = Form::new()
        .text("category_id", "2")
        .text("name", name.to_string())
        .text("description", "Knitted wool")
        .text("price", price.to_string());
    match image {
        Some(file_name) => form.part(
            "image",
            Part::bytes(vec![0xFF, 0xD8, 0xFF, 0xE0])
                .file_name(file_name.to_string())
                .mime_str("image/jpeg")
                .unwrap(),
        ),
        None => form,
    }
}

#[tokio::test]
async fn test_status_change_is_recorded_and_shown() {
    let ctx = TestContext::new().await;
    ctx.login(CUSTOMER_EMAIL, None).await;
    ctx.cart("add", "1").await;
    ctx.post_form("/cart/checkout", &[]).await;
    ctx.post_form("/logout", &[]).await;
    ctx.login(ADMIN_EMAIL, None).await;
    assert_eq!(ctx.backend.item_status(1).as_deref(), Some("PENDING"));

    let response = ctx
        .post_form("/admin/order-details/1/status", &[("status", "SHIPPED")])
        .await;
    assert_eq!(
        location(&response),
        "/admin/order-details/1?success=Order%20status%20updated%20successfully"
    );
    assert_eq!(ctx.backend.item_status(1).as_deref(), Some("SHIPPED"));

    let html = ctx.page("/admin/order-details/1").await;
    assert!(html.contains("<strong>Order Status:</strong> Shipped"));

    let details = r#"href="/admin/order-details/1""#;
    assert!(ctx.page("/admin/orders?status=SHIPPED").await.contains(details));
    assert!(!ctx.page("/admin/orders?status=PENDING").await.contains(details));
}

#[tokio::test]
async fn test_unknown_status_never_reaches_backend() {
    let ctx = TestContext::new().await;
    ctx.login(CUSTOMER_EMAIL, None).await;
    ctx.cart("add", "1").await;
    ctx.post_form("/cart/checkout", &[]).await;
    ctx.post_form("/logout", &[]).await;
    ctx.login(ADMIN_EMAIL, None).await;

    let response = ctx
        .post_form("/admin/order-details/1/status", &[("status", "LOST")])
        .await;
    assert!(location(&response).starts_with("/admin/order-details/1?error="));
    assert_eq!(ctx.backend.item_status(1).as_deref(), Some("PENDING"));
}

#[tokio::test]
async fn test_created_product_appears_on_cached_home_page() {
    let ctx = admin().await;

    // Warm the catalog cache first.
    assert!(!ctx.page("/").await.contains("Wool Scarf"));

    let response = ctx
        .post_multipart("/admin/products", product_form("Wool Scarf", "12.50", Some("scarf.jpg")))
        .await;
    assert_eq!(
        location(&response),
        "/admin/products?success=Product%20created%20successfully"
    );

    let product = ctx.backend.product_named("Wool Scarf").unwrap();
    assert_eq!(product["price"], "12.50");
    assert_eq!(product["categoryId"], 2);
    assert_eq!(product["description"], "Knitted wool");
    assert_eq!(
        ctx.backend.uploads(),
        vec![Upload {
            file_name: "scarf.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            len: 4,
        }]
    );

    assert!(ctx.page("/").await.contains("Wool Scarf"));
    assert!(ctx.page("/category/2").await.contains("Wool Scarf"));
}

#[tokio::test]
async fn test_product_without_image_is_refused_locally() {
    let ctx = admin().await;

    let response = ctx
        .post_multipart("/admin/products", product_form("Wool Scarf", "12.50", None))
        .await;
    assert_eq!(
        location(&response),
        "/admin/add-product?error=Product%20image%20is%20required"
    );
    assert!(ctx.backend.product_named("Wool Scarf").is_none());
}

#[tokio::test]
async fn test_product_update_and_delete() {
    let ctx = admin().await;
    assert!(ctx.page("/product/3").await.contains("Straw Hat"));

    let response = ctx
        .post_multipart("/admin/products/3", product_form("Panama Hat", "21.00", None))
        .await;
    assert_eq!(
        location(&response),
        "/admin/products?success=Product%20updated%20successfully"
    );
    assert!(ctx.backend.uploads().is_empty());
    assert!(ctx.page("/product/3").await.contains("Panama Hat"));

    let response = ctx.post_form("/admin/products/3/delete", &[]).await;
    assert_eq!(
        location(&response),
        "/admin/products?success=Product%20deleted%20successfully"
    );
    assert!(ctx.backend.product_named("Panama Hat").is_none());
    assert!(!ctx.page("/").await.contains("Panama Hat"));
}

#[tokio::test]
async fn test_category_create_rename_delete() {
    let ctx = admin().await;
    assert!(!ctx.page("/admin/categories").await.contains("Scarves"));

    let response = ctx.post_form("/admin/categories", &[("name", "Scarves")]).await;
    assert_eq!(
        location(&response),
        "/admin/categories?success=Category%20created%20successfully"
    );
    let created = ctx.backend.category_named("Scarves").unwrap();
    assert_eq!(created["id"], 3);
    assert!(ctx.page("/admin/categories").await.contains("Scarves"));

    let response = ctx.post_form("/admin/categories/3", &[("name", "Wraps")]).await;
    assert_eq!(
        location(&response),
        "/admin/categories?success=Category%20updated%20successfully"
    );
    let html = ctx.page("/admin/categories").await;
    assert!(html.contains("Wraps"));
    assert!(!html.contains("Scarves"));

    let response = ctx.post_form("/admin/categories/3/delete", &[]).await;
    assert_eq!(
        location(&response),
        "/admin/categories?success=Category%20deleted%20successfully"
    );
    assert!(ctx.backend.category_named("Wraps").is_none());
    assert!(!ctx.page("/admin/categories").await.contains("Wraps"));
}

#[tokio::test]
async fn test_rejected_admin_credential_is_dropped() {
    let ctx = admin().await;
    ctx.backend.revoke_tokens();

    let response = ctx.get("/admin/orders").await;
    assert_eq!(location(&response), "/login?from=%2Fadmin%2Forders");

    // The credential is gone, so the guard answers without a backend call.
    let response = ctx.get("/admin/orders").await;
    assert_eq!(location(&response), "/login?from=%2Fadmin%2Forders");
    assert!(ctx.page("/cart").await.contains(r#"href="/login""#));
}

#[tokio::test]
async fn test_rejected_admin_write_returns_to_form_after_login() {
    let ctx = admin().await;
    ctx.backend.revoke_tokens();

    let response = ctx.post_form("/admin/categories/1/delete", &[]).await;
    assert_eq!(location(&response), "/login?from=%2Fadmin%2Fcategories");
    assert!(ctx.backend.category_named("Shirts").is_some());
    assert_eq!(location(&ctx.get("/admin").await), "/login?from=%2Fadmin");
}
