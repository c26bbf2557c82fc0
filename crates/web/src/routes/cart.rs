//! Cart route handlers.
//!
//! The cart is kept in the session record under `cart` and never leaves the
//! web client until checkout, which turns each line into a backend order.
//! Product names and prices come from the backend's stock list, not from
//! the submitted form.
//!
//! Every cart mutation runs under the user's checkout permit. The handler
//! re-reads the session record once it holds the permit and writes it back
//! before letting go, so a concurrent request never works on a stale cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use ldms_core::{Cart, LOGIN_PATH, ProductRef, Quantity, StockId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{SESSION_EXPIRED_MESSAGE, action_failed, redirect_with};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireClient;
use crate::models::{Chrome, Flash, session_keys};
use crate::services::checkout::{CheckoutReport, checkout as place_orders};
use crate::state::AppState;

const CART_PATH: &str = "/client/cart";
const PRODUCTS_PATH: &str = "/client/products";
const ORDERS_PATH: &str = "/client/orders";

/// Shown when a cart change arrives while the cart is being checked out.
const CHECKOUT_BUSY_MESSAGE: &str =
    "Your cart is being checked out. Try again once the checkout finishes.";

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart from the session.
///
/// # Errors
///
/// Returns `AppError::Session` if the session record cannot be read.
pub async fn load(session: &Session) -> Result<Cart> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Get the cart as currently stored, discarding this request's copy of the
/// session record.
async fn load_fresh(session: &Session) -> Result<Cart> {
    session.load().await?;
    load(session).await
}

/// Store the cart in the session.
async fn save(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

/// Write the session record to the store now instead of after the response.
async fn persist(session: &Session, response: Response) -> Result<Response> {
    session.save().await?;
    Ok(response)
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub stock_id: StockId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub index: usize,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "client/cart.html")]
pub struct CartTemplate {
    pub chrome: Chrome,
    pub cart: Cart,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart.
pub async fn show(RequireClient(auth): RequireClient) -> Result<impl IntoResponse> {
    let cart = load(&auth.session).await?;
    Ok(CartTemplate {
        cart,
        chrome: auth.chrome().await,
    })
}

/// Add a product to the cart.
///
/// Adding a product that is already in the cart appends another line.
#[instrument(skip_all, fields(stock_id = %form.stock_id, quantity = form.quantity))]
pub async fn add(
    State(state): State<AppState>,
    RequireClient(auth): RequireClient,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let Some(_permit) = state.checkouts().try_begin(auth.user.id) else {
        return Ok(redirect_with(
            &auth.session,
            Flash::info(CHECKOUT_BUSY_MESSAGE),
            PRODUCTS_PATH,
        )
        .await);
    };

    let Ok(quantity) = Quantity::new(form.quantity) else {
        return Ok(redirect_with(
            &auth.session,
            Flash::error("Quantity must be at least 1."),
            PRODUCTS_PATH,
        )
        .await);
    };

    let stocks = match state.api().list_stocks(&auth.user.token).await {
        Ok(stocks) => stocks,
        Err(e) => return Ok(action_failed(&state, &auth.session, &e, PRODUCTS_PATH).await),
    };
    let Some(stock) = stocks.into_iter().find(|s| s.id == form.stock_id) else {
        return Ok(redirect_with(
            &auth.session,
            Flash::error("That product is no longer available."),
            PRODUCTS_PATH,
        )
        .await);
    };

    let mut cart = load_fresh(&auth.session).await?;
    let name = stock.name.clone();
    cart.add(
        ProductRef {
            id: stock.id,
            name: stock.name,
            price: stock.price,
        },
        quantity,
    );
    save(&auth.session, &cart).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("stock_id", &form.stock_id.to_string())]),
    );
    let response = redirect_with(
        &auth.session,
        Flash::success(format!("Added {} x {name} to your cart.", quantity.get())),
        PRODUCTS_PATH,
    )
    .await;
    persist(&auth.session, response).await
}

/// Remove a line from the cart.
///
/// # Errors
///
/// Returns `AppError::Cart` (400) when the index does not name a line.
#[instrument(skip_all, fields(index = form.index))]
pub async fn remove(
    State(state): State<AppState>,
    RequireClient(auth): RequireClient,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let Some(_permit) = state.checkouts().try_begin(auth.user.id) else {
        return Ok(redirect_with(
            &auth.session,
            Flash::info(CHECKOUT_BUSY_MESSAGE),
            CART_PATH,
        )
        .await);
    };

    let mut cart = load_fresh(&auth.session).await?;
    let removed = cart.remove(form.index)?;
    save(&auth.session, &cart).await?;

    add_breadcrumb("cart", "Removed from cart", None);
    let response = redirect_with(
        &auth.session,
        Flash::info(format!("Removed {} from your cart.", removed.product.name)),
        CART_PATH,
    )
    .await;
    persist(&auth.session, response).await
}

/// Turn every cart line into an order.
///
/// Lines the backend accepted leave the cart; failed lines stay for another
/// attempt. Cart changes are refused until the checkout finishes.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireClient(auth): RequireClient,
) -> Result<Response> {
    let Some(_permit) = state.checkouts().try_begin(auth.user.id) else {
        return Ok(redirect_with(
            &auth.session,
            Flash::info("A checkout is already in progress."),
            CART_PATH,
        )
        .await);
    };

    let mut cart = load_fresh(&auth.session).await?;
    if cart.is_empty() {
        return Ok(redirect_with(&auth.session, Flash::info("Your cart is empty."), CART_PATH).await);
    }

    add_breadcrumb("cart", "Checkout started", None);
    let report = place_orders(state.api(), &auth.user, &mut cart).await;

    // Keep notices queued by requests refused while the orders were placed
    auth.session.load().await?;
    save(&auth.session, &cart).await?;

    let response = if report.session_expired() {
        state.sessions().forget(&auth.session).await;
        redirect_with(
            &auth.session,
            Flash::info(SESSION_EXPIRED_MESSAGE),
            LOGIN_PATH,
        )
        .await
    } else {
        let (notice, to) = checkout_notice(&report);
        redirect_with(&auth.session, notice, to).await
    };
    persist(&auth.session, response).await
}

/// Notification and destination after a checkout that kept its session.
fn checkout_notice(report: &CheckoutReport) -> (Flash, &'static str) {
    if report.is_complete() {
        let noun = if report.placed == 1 { "order" } else { "orders" };
        return (
            Flash::success(format!("Placed {} {noun}.", report.placed)),
            ORDERS_PATH,
        );
    }

    let reason = report
        .failures
        .first()
        .map(crate::api::ApiError::user_message)
        .unwrap_or_default();
    (
        Flash::error(format!(
            "Placed {} of {} orders. {} item(s) remain in your cart. {reason}",
            report.placed,
            report.placed + report.remaining,
            report.remaining,
        )),
        CART_PATH,
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ldms_core::Price;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::api::ApiError;
    use crate::models::FlashLevel;

    #[tokio::test]
    async fn test_cart_round_trips_through_session() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        assert!(load(&session).await.unwrap_or_default().is_empty());

        let mut cart = Cart::new();
        cart.add(
            ProductRef {
                id: StockId::new(7),
                name: "Widget".to_string(),
                price: Price::from(100),
            },
            Quantity::ONE,
        );
        save(&session, &cart).await.unwrap_or_else(|e| panic!("{e}"));

        let loaded = load(&session).await.unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(loaded, cart);
    }

    #[tokio::test]
    async fn test_fresh_load_sees_cart_saved_by_another_request() {
        let store = Arc::new(MemoryStore::default());
        let first = Session::new(None, store.clone(), None);
        save(&first, &Cart::new()).await.unwrap_or_else(|e| panic!("{e}"));
        first.save().await.unwrap_or_else(|e| panic!("{e}"));

        let second = Session::new(first.id(), store, None);
        assert!(load(&second).await.unwrap_or_else(|e| panic!("{e}")).is_empty());

        let mut cart = Cart::new();
        cart.add(
            ProductRef {
                id: StockId::new(7),
                name: "Widget".to_string(),
                price: Price::from(100),
            },
            Quantity::ONE,
        );
        save(&first, &cart).await.unwrap_or_else(|e| panic!("{e}"));
        first.save().await.unwrap_or_else(|e| panic!("{e}"));

        // The second request still holds the record it read first
        assert!(load(&second).await.unwrap_or_else(|e| panic!("{e}")).is_empty());
        let fresh = load_fresh(&second).await.unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(fresh, cart);
    }

    #[test]
    fn test_complete_checkout_goes_to_orders() {
        let report = CheckoutReport {
            placed: 2,
            failures: Vec::new(),
            remaining: 0,
        };
        let (notice, to) = checkout_notice(&report);
        assert_eq!(notice.level, FlashLevel::Success);
        assert_eq!(notice.message, "Placed 2 orders.");
        assert_eq!(to, ORDERS_PATH);
    }

    #[test]
    fn test_partial_checkout_stays_on_cart() {
        let report = CheckoutReport {
            placed: 1,
            failures: vec![ApiError::Server { status: 503 }],
            remaining: 1,
        };
        let (notice, to) = checkout_notice(&report);
        assert_eq!(notice.level, FlashLevel::Error);
        assert!(notice.message.starts_with("Placed 1 of 2 orders. 1 item(s) remain"));
        assert_eq!(to, CART_PATH);
    }
}
