//! Checkout requires a login and clears the cart only when the backend
//! accepts the order.

use marigold_integration_tests::{CUSTOMER_EMAIL, TestContext, location};

#[tokio::test]
async fn test_anonymous_checkout_goes_to_login_and_keeps_cart() {
    let ctx = TestContext::new().await;
    ctx.cart("add", "1").await;

    let response = ctx.post_form("/cart/checkout", &[]).await;
    assert_eq!(
        location(&response),
        "/login?from=%2Fcart&error=You%20need%20to%20login%20first%20before%20you%20can%20place%20an%20order"
    );
    assert!(ctx.page("/cart").await.contains("Cart (1)"));
    assert!(ctx.backend.placed_orders().is_empty());

    // Logging in from there returns to the cart.
    assert_eq!(location(&ctx.login(CUSTOMER_EMAIL, Some("/cart")).await), "/cart");
}

#[tokio::test]
async fn test_successful_checkout_clears_cart() {
    let ctx = TestContext::new().await;
    ctx.login(CUSTOMER_EMAIL, None).await;
    ctx.cart("add", "1").await;
    ctx.cart("increment", "1").await;

    let response = ctx.post_form("/cart/checkout", &[]).await;
    assert_eq!(
        location(&response),
        "/cart?success=Order%20was%20successfully%20placed"
    );

    let orders = ctx.backend.placed_orders();
    assert_eq!(orders.len(), 1);
    let order = orders.first().expect("one order");
    let line = &order["items"][0];
    assert_eq!(line["productId"], 1);
    assert_eq!(line["quantity"], 2);

    let html = ctx.page("/cart?success=Order%20was%20successfully%20placed").await;
    assert!(html.contains("Your cart is empty"));
    assert!(html.contains("Order was successfully placed"));

    // The order shows up in the history.
    let profile = ctx.page("/profile").await;
    assert!(profile.contains("Linen Shirt"));
    assert!(profile.contains("Pending"));
}

#[tokio::test]
async fn test_rejected_order_keeps_cart() {
    let ctx = TestContext::new().await;
    ctx.login(CUSTOMER_EMAIL, None).await;
    ctx.cart("add", "3").await;
    ctx.backend.reject_orders(true);

    let response = ctx.post_form("/cart/checkout", &[]).await;
    assert_eq!(location(&response), "/cart?error=Out%20of%20stock");
    assert!(ctx.page("/cart").await.contains("Straw Hat"));
    assert!(ctx.backend.placed_orders().is_empty());
}

#[tokio::test]
async fn test_empty_cart_checkout_is_refused() {
    let ctx = TestContext::new().await;
    ctx.login(CUSTOMER_EMAIL, None).await;

    let response = ctx.post_form("/cart/checkout", &[]).await;
    assert_eq!(location(&response), "/cart?error=Your%20cart%20is%20empty");
    assert!(ctx.backend.placed_orders().is_empty());
}

#[tokio::test]
async fn test_expired_login_at_checkout_keeps_cart() {
    let ctx = TestContext::new().await;
    ctx.login(CUSTOMER_EMAIL, None).await;
    ctx.cart("add", "2").await;
    ctx.backend.revoke_tokens();

    let response = ctx.post_form("/cart/checkout", &[]).await;
    assert_eq!(location(&response), "/login?from=%2Fcart");

    let html = ctx.page("/cart").await;
    assert!(html.contains("Oxford Shirt"));
    assert!(html.contains(r#"href="/login""#));
}
