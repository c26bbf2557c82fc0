//! End-to-end client journey: login, role routing, cart, checkout, logout.

use std::time::Duration;

use ldms_core::LOGIN_PATH;
use ldms_integration_tests::{TestContext, location};
use serde_json::json;

fn assert_redirect(response: &reqwest::Response, to: &str) {
    assert!(
        response.status().is_redirection(),
        "expected redirect, got {}",
        response.status()
    );
    assert_eq!(location(response), Some(to));
}

#[tokio::test]
async fn test_client_journey() {
    let ctx = TestContext::new().await;

    // Login lands on the client dashboard
    let response = ctx.login("a@b.com", "x").await;
    assert_redirect(&response, "/client");
    assert!(ctx.page("/client").await.contains("Dashboard"));

    // Admin views are refused for a client
    assert_redirect(&ctx.get("/admin").await, LOGIN_PATH);

    // Two lines for the same product
    let response = ctx
        .post("/client/cart/add", &[("stock_id", "7"), ("quantity", "2")])
        .await;
    assert_redirect(&response, "/client/products");
    ctx.post("/client/cart/add", &[("stock_id", "7"), ("quantity", "1")])
        .await;

    let cart = ctx.page("/client/cart").await;
    assert_eq!(cart.matches("name=\"index\"").count(), 2);
    assert!(cart.contains("RWF 300"));

    // Checkout places one order per line and empties the cart
    let response = ctx.post("/client/cart/checkout", &[]).await;
    assert_redirect(&response, "/client/orders");
    assert_eq!(
        ctx.placed_orders(),
        vec![
            json!({ "productId": 7, "quantity": 2, "userId": 1 }),
            json!({ "productId": 7, "quantity": 1, "userId": 1 }),
        ]
    );

    let orders = ctx.page("/client/orders").await;
    assert!(orders.contains("Placed 2 orders."));
    assert!(orders.contains("Order Created"));
    assert!(ctx.page("/client/cart").await.contains("Your cart is empty"));

    // Logout ends access to client views
    assert_redirect(&ctx.post("/logout", &[]).await, LOGIN_PATH);
    assert_redirect(&ctx.get("/client").await, LOGIN_PATH);
}

#[tokio::test]
async fn test_anonymous_visitor_is_sent_to_login() {
    let ctx = TestContext::new().await;

    for path in ["/client", "/client/cart", "/driver", "/stock-manager", "/admin"] {
        assert_redirect(&ctx.get(path).await, LOGIN_PATH);
    }
    assert!(ctx.page("/").await.contains("Log in"));
}

#[tokio::test]
async fn test_wrong_password_shows_notice() {
    let ctx = TestContext::new().await;

    let response = ctx.login("a@b.com", "nope").await;
    assert_redirect(&response, LOGIN_PATH);

    let page = ctx.page(LOGIN_PATH).await;
    assert!(page.contains("Invalid email or password."));
    assert_redirect(&ctx.get("/client").await, LOGIN_PATH);
}

#[tokio::test]
async fn test_admin_lands_on_admin_dashboard_and_not_client_views() {
    let ctx = TestContext::new().await;

    assert_redirect(&ctx.login("admin@b.com", "y").await, "/admin");
    assert_redirect(&ctx.get("/client/cart").await, LOGIN_PATH);
}

#[tokio::test]
async fn test_logged_in_visitor_skips_login_page() {
    let ctx = TestContext::new().await;
    ctx.login("a@b.com", "x").await;

    assert_redirect(&ctx.get(LOGIN_PATH).await, "/client");
}

#[tokio::test]
async fn test_cart_remove_and_invalid_index() {
    let ctx = TestContext::new().await;
    ctx.login("a@b.com", "x").await;
    ctx.post("/client/cart/add", &[("stock_id", "7"), ("quantity", "3")])
        .await;

    let response = ctx.post("/client/cart/remove", &[("index", "5")]).await;
    assert_eq!(response.status(), 400);

    assert_redirect(
        &ctx.post("/client/cart/remove", &[("index", "0")]).await,
        "/client/cart",
    );
    assert!(ctx.page("/client/cart").await.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_zero_quantity_is_refused() {
    let ctx = TestContext::new().await;
    ctx.login("a@b.com", "x").await;

    ctx.post("/client/cart/add", &[("stock_id", "7"), ("quantity", "0")])
        .await;

    let products = ctx.page("/client/products").await;
    assert!(products.contains("Quantity must be at least 1."));
    assert!(ctx.page("/client/cart").await.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_health_and_security_headers() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/health").await;
    assert_eq!(response.status(), 200);
    let headers = response.headers();
    assert!(headers.contains_key("x-request-id"));
    assert_eq!(
        headers.get("x-frame-options").and_then(|v| v.to_str().ok()),
        Some("DENY")
    );
    assert!(
        headers
            .get("content-security-policy")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|csp| csp.contains("img-src 'self' data:"))
    );
}

#[tokio::test]
async fn test_cart_changes_wait_for_running_checkout() {
    let ctx = TestContext::with_order_delay(Duration::from_millis(400)).await;
    ctx.login("a@b.com", "x").await;
    ctx.post("/client/cart/add", &[("stock_id", "7"), ("quantity", "2")])
        .await;

    let checkout = {
        let client = ctx.client.clone();
        let url = ctx.url("/client/cart/checkout");
        tokio::spawn(async move { client.post(url).send().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Both land while the first order is still being placed
    let add = ctx
        .post("/client/cart/add", &[("stock_id", "7"), ("quantity", "5")])
        .await;
    assert_redirect(&add, "/client/products");
    let remove = ctx.post("/client/cart/remove", &[("index", "0")]).await;
    assert_redirect(&remove, "/client/cart");

    let checkout = checkout
        .await
        .unwrap_or_else(|e| panic!("checkout task: {e}"))
        .unwrap_or_else(|e| panic!("checkout request: {e}"));
    assert_redirect(&checkout, "/client/orders");
    assert_eq!(
        ctx.placed_orders(),
        vec![json!({ "productId": 7, "quantity": 2, "userId": 1 })]
    );

    let orders = ctx.page("/client/orders").await;
    assert!(orders.contains("Placed 1 order."));
    assert!(orders.contains("Your cart is being checked out."));
    assert!(!orders.contains("Added 5 x Widget"));
    assert!(ctx.page("/client/cart").await.contains("Your cart is empty"));

    // The cart takes changes again once the checkout is over
    ctx.post("/client/cart/add", &[("stock_id", "7"), ("quantity", "5")])
        .await;
    let cart = ctx.page("/client/cart").await;
    assert_eq!(cart.matches("name=\"index\"").count(), 1);
    assert!(cart.contains("RWF 500"));
}

#[tokio::test]
async fn test_revoked_token_ends_session_on_page_load() {
    let ctx = TestContext::new().await;
    ctx.login("a@b.com", "x").await;
    assert!(ctx.page("/client").await.contains("Dashboard"));

    ctx.revoke_token("t1");

    assert_redirect(&ctx.get("/client/orders").await, LOGIN_PATH);
    let login = ctx.page(LOGIN_PATH).await;
    assert!(login.contains("Your session has expired. Please log in again."));
    assert_redirect(&ctx.get("/client").await, LOGIN_PATH);
}

#[tokio::test]
async fn test_revoked_token_ends_session_on_action() {
    let ctx = TestContext::new().await;
    ctx.login("a@b.com", "x").await;

    ctx.revoke_token("t1");

    let response = ctx
        .post("/client/cart/add", &[("stock_id", "7"), ("quantity", "1")])
        .await;
    assert_redirect(&response, LOGIN_PATH);
    assert!(
        ctx.page(LOGIN_PATH)
            .await
            .contains("Your session has expired. Please log in again.")
    );
    assert_redirect(&ctx.get("/client/cart").await, LOGIN_PATH);
    assert!(ctx.placed_orders().is_empty());
}
