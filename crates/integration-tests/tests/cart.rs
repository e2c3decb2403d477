//! Cart actions over HTTP, persisted in the session between requests.

use marigold_integration_tests::{TestContext, location};

#[tokio::test]
async fn test_add_increment_decrement_remove() {
    let ctx = TestContext::new().await;

    assert_eq!(location(&ctx.cart("add", "1").await), "/cart");
    let html = ctx.page("/cart").await;
    assert!(html.contains("Linen Shirt"));
    assert!(html.contains("Cart (1)"));

    ctx.cart("increment", "1").await;
    ctx.cart("add", "3").await;
    let html = ctx.page("/cart").await;
    assert!(html.contains("Cart (3)"));
    assert!(html.contains("Total: $78.48"));

    // Adding again leaves the quantity alone.
    ctx.cart("add", "1").await;
    assert!(ctx.page("/cart").await.contains("Cart (3)"));

    ctx.cart("decrement", "1").await;
    assert!(ctx.page("/cart").await.contains("Cart (2)"));

    // The last unit takes the line with it.
    ctx.cart("decrement", "1").await;
    let html = ctx.page("/cart").await;
    assert!(!html.contains("Linen Shirt"));
    assert!(html.contains("Cart (1)"));

    ctx.cart("remove", "3").await;
    let html = ctx.page("/cart").await;
    assert!(html.contains("Your cart is empty"));
    assert!(html.contains("Cart (0)"));
}

#[tokio::test]
async fn test_cart_action_returns_to_listing() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_form(
            "/cart/add",
            &[("product_id", "2"), ("return_to", "/category/1?page=1")],
        )
        .await;
    assert_eq!(location(&response), "/category/1?page=1");

    let html = ctx.page("/category/1").await;
    assert!(html.contains("Oxford Shirt"));
    assert!(html.contains(r#"aria-label="Add one""#));
}

#[tokio::test]
async fn test_offsite_return_is_replaced_by_cart() {
    let ctx = TestContext::new().await;
    let response = ctx
        .post_form(
            "/cart/add",
            &[("product_id", "2"), ("return_to", "https://evil.example/")],
        )
        .await;
    assert_eq!(location(&response), "/cart");
}

#[tokio::test]
async fn test_unknown_product_is_not_added() {
    let ctx = TestContext::new().await;

    let response = ctx.cart("add", "99").await;
    assert_eq!(
        location(&response),
        "/cart?error=That%20product%20is%20no%20longer%20available"
    );
    assert!(ctx.page("/cart").await.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_decrement_of_absent_product_is_harmless() {
    let ctx = TestContext::new().await;
    ctx.cart("add", "1").await;

    ctx.cart("decrement", "2").await;
    ctx.cart("remove", "2").await;

    assert!(ctx.page("/cart").await.contains("Cart (1)"));
}

#[tokio::test]
async fn test_carts_are_per_session() {
    let first = TestContext::new().await;
    first.cart("add", "1").await;

    let other = reqwest::Client::new();
    let html = other
        .get(first.url("/cart"))
        .send()
        .await
        .expect("GET failed")
        .text()
        .await
        .expect("Failed to read page");
    assert!(html.contains("Your cart is empty"));
}
