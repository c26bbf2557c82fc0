//! Stock manager, driver and admin views against the fake backend.

use ldms_core::LOGIN_PATH;
use ldms_integration_tests::{TestContext, location};
use reqwest::multipart::{Form, Part};
use serde_json::json;

fn assert_redirect(response: &reqwest::Response, to: &str) {
    assert!(
        response.status().is_redirection(),
        "expected redirect, got {}",
        response.status()
    );
    assert_eq!(location(response), Some(to));
}

fn stock_form(status: &str) -> Form {
    Form::new()
        .text("name", "Crate")
        .text("price", "12.5")
        .text("in_stock", "4")
        .text("status", status.to_string())
        .part("image", Part::bytes(Vec::new()).file_name(""))
}

#[tokio::test]
async fn test_stock_manager_creates_stock() {
    let ctx = TestContext::new().await;
    assert_redirect(&ctx.login("sm@b.com", "z").await, "/stock-manager");
    let dashboard = ctx.page("/stock-manager").await;
    assert!(dashboard.contains("<strong>1</strong> in stock"));

    let response = ctx
        .post_multipart("/stock-manager/stocks", stock_form("Out of stock"))
        .await;
    assert_redirect(&response, "/stock-manager/stocks");

    let created = ctx.backend_log().created_stocks;
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].get("name").map(String::as_str), Some("Crate"));
    assert_eq!(created[0].get("inStock").map(String::as_str), Some("4"));
    assert_eq!(created[0].get("status").map(String::as_str), Some("Out of stock"));
    assert!(!created[0].contains_key("image"));

    let stocks = ctx.page("/stock-manager/stocks").await;
    assert!(stocks.contains("Added Crate."));
}

#[tokio::test]
async fn test_unknown_stock_status_is_reported() {
    let ctx = TestContext::new().await;
    ctx.login("sm@b.com", "z").await;

    let response = ctx
        .post_multipart("/stock-manager/stocks", stock_form("Discontinued"))
        .await;
    assert_redirect(&response, "/stock-manager/stocks");

    assert!(ctx.backend_log().created_stocks.is_empty());
    assert!(ctx.page("/stock-manager/stocks").await.contains("is not valid."));
}

#[tokio::test]
async fn test_stock_manager_accepts_order() {
    let ctx = TestContext::new().await;
    ctx.login("sm@b.com", "z").await;

    let orders = ctx.page("/stock-manager/orders").await;
    assert!(orders.contains("#31"));
    assert!(orders.contains(r#"<option value="4" selected>Dee</option>"#));

    let response = ctx.post("/stock-manager/orders/31/accept", &[]).await;
    assert_redirect(&response, "/stock-manager/orders");
    assert_eq!(
        ctx.backend_log().status_updates,
        vec![(31, json!({ "status": "Order Accepted" }))]
    );
    assert!(ctx.page("/stock-manager/orders").await.contains("Order #31 accepted."));

    // Client views stay closed to stock managers
    assert_redirect(&ctx.get("/client").await, LOGIN_PATH);
}

#[tokio::test]
async fn test_driver_marks_order_delivered() {
    let ctx = TestContext::new().await;
    assert_redirect(&ctx.login("d@b.com", "w").await, "/driver");

    let dashboard = ctx.page("/driver").await;
    assert!(dashboard.contains("/driver/orders/31/delivered"));
    assert!(!dashboard.contains("/driver/orders/32/delivered"));
    assert!(dashboard.contains("Completed"));

    let response = ctx.post("/driver/orders/31/delivered", &[]).await;
    assert_redirect(&response, "/driver");
    assert_eq!(ctx.backend_log().delivered, vec![31]);
    assert!(ctx.page("/driver").await.contains("Order #31 marked as delivered."));

    assert_redirect(&ctx.get("/stock-manager").await, LOGIN_PATH);
}

#[tokio::test]
async fn test_admin_creates_user() {
    let ctx = TestContext::new().await;
    assert_redirect(&ctx.login("admin@b.com", "y").await, "/admin");

    let users = ctx.page("/admin/users").await;
    assert!(users.contains("d@b.com"));

    let form = [
        ("name", "Kim"),
        ("email", "k@b.com"),
        ("password", "pw"),
        ("role", "driver"),
    ];
    let response = ctx.post("/admin/users", &form).await;
    assert_redirect(&response, "/admin/users");
    assert_eq!(
        ctx.backend_log().created_users,
        vec![json!({ "name": "Kim", "email": "k@b.com", "password": "pw", "role": "driver" })]
    );
    assert!(ctx.page("/admin/users").await.contains("Created Kim."));
}

#[tokio::test]
async fn test_admin_user_form_reports_bad_input() {
    let ctx = TestContext::new().await;
    ctx.login("admin@b.com", "y").await;

    let unknown_role = [
        ("name", "Kim"),
        ("email", "k@b.com"),
        ("password", "pw"),
        ("role", "pilot"),
    ];
    let response = ctx.post("/admin/users", &unknown_role).await;
    assert_redirect(&response, "/admin/users");
    assert!(ctx.page("/admin/users").await.contains("is not recognized."));

    let response = ctx.post("/admin/users/2/delete", &[]).await;
    assert_redirect(&response, "/admin/users");
    assert!(ctx.page("/admin/users").await.contains("You cannot delete your own account."));

    let response = ctx.post("/admin/users/4/delete", &[]).await;
    assert_redirect(&response, "/admin/users");
    let log = ctx.backend_log();
    assert!(log.created_users.is_empty());
    assert_eq!(log.deleted_users, vec![4]);
}
