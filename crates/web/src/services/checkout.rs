//! Cart checkout: one backend order per cart line.
//!
//! Lines are submitted sequentially. Each line that the backend accepts is
//! removed from the cart; lines that fail stay so the client can retry.
//! Submission stops at the first `Unauthorized` answer since every later
//! request would fail the same way.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use ldms_core::{AuthToken, Cart, UserId, UserSession};
use tracing::instrument;

use crate::api::{ApiClient, ApiError, NewOrder};

/// Where checkout sends orders.
pub trait OrderSink: Send + Sync {
    /// Create one order.
    fn place_order(
        &self,
        token: &AuthToken,
        order: &NewOrder,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl OrderSink for ApiClient {
    fn place_order(
        &self,
        token: &AuthToken,
        order: &NewOrder,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        self.create_order(token, order)
    }
}

/// Result of a checkout run.
#[derive(Debug, Default)]
pub struct CheckoutReport {
    /// Orders the backend accepted.
    pub placed: usize,
    /// One error per line that was attempted and failed.
    pub failures: Vec<ApiError>,
    /// Lines left in the cart afterwards.
    pub remaining: usize,
}

impl CheckoutReport {
    /// Whether every line became an order.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    /// Whether the backend rejected the token part way through.
    #[must_use]
    pub fn session_expired(&self) -> bool {
        self.failures.iter().any(ApiError::is_unauthorized)
    }
}

/// Submit every cart line as an order for `user`.
///
/// Accepted lines are removed from `cart`; failed and unattempted lines are
/// kept in their original order.
#[instrument(skip(sink, user, cart), fields(user_id = %user.id, lines = cart.len()))]
pub async fn checkout<S: OrderSink>(
    sink: &S,
    user: &UserSession,
    cart: &mut Cart,
) -> CheckoutReport {
    let mut report = CheckoutReport::default();
    let mut placed = Vec::with_capacity(cart.len());

    for entry in cart.entries() {
        if report.session_expired() {
            placed.push(false);
            continue;
        }

        let order = NewOrder {
            product_id: entry.product.id,
            quantity: entry.quantity,
            user_id: user.id,
        };
        match sink.place_order(&user.token, &order).await {
            Ok(()) => {
                report.placed += 1;
                placed.push(true);
            }
            Err(e) => {
                tracing::warn!(product_id = %order.product_id, error = %e, "Order failed");
                report.failures.push(e);
                placed.push(false);
            }
        }
    }

    cart.retain_indexed(|i| !placed.get(i).copied().unwrap_or(false));
    report.remaining = cart.len();

    tracing::info!(
        placed = report.placed,
        failed = report.failures.len(),
        remaining = report.remaining,
        "Checkout finished"
    );
    report
}

/// Serializes cart changes per user.
///
/// A checkout holds the user's permit while its orders are placed, so a
/// second checkout or an add/remove for the same user is refused until it
/// finishes.
#[derive(Debug, Default)]
pub struct CheckoutGuard {
    in_flight: Mutex<HashSet<UserId>>,
}

/// Held for the duration of one cart change; releases the user on drop.
#[derive(Debug)]
pub struct CheckoutPermit<'a> {
    guard: &'a CheckoutGuard,
    user: UserId,
}

impl CheckoutGuard {
    /// Create an empty guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `user`'s cart, or `None` if another change holds it.
    #[must_use]
    pub fn try_begin(&self, user: UserId) -> Option<CheckoutPermit<'_>> {
        let inserted = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user);
        inserted.then_some(CheckoutPermit { guard: self, user })
    }
}

impl Drop for CheckoutPermit<'_> {
    fn drop(&mut self) {
        self.guard
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.user);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ldms_core::{Price, ProductRef, Quantity, Role, StockId};

    use super::*;

    /// Records orders; fails the calls whose (0-based) position is listed.
    #[derive(Default)]
    struct RecordingSink {
        fail_at: Vec<usize>,
        unauthorized_at: Option<usize>,
        calls: Mutex<Vec<NewOrder>>,
    }

    impl OrderSink for RecordingSink {
        async fn place_order(&self, _token: &AuthToken, order: &NewOrder) -> Result<(), ApiError> {
            let position = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(order.clone());
                calls.len() - 1
            };
            if self.unauthorized_at == Some(position) {
                Err(ApiError::Unauthorized)
            } else if self.fail_at.contains(&position) {
                Err(ApiError::Server { status: 500 })
            } else {
                Ok(())
            }
        }
    }

    fn user() -> UserSession {
        UserSession::new(AuthToken::parse("t1").unwrap(), Role::Client, UserId::new(1))
    }

    fn cart(quantities: &[u32]) -> Cart {
        let mut cart = Cart::new();
        for (i, q) in quantities.iter().enumerate() {
            cart.add(
                ProductRef {
                    id: StockId::new(i64::try_from(i).unwrap() + 1),
                    name: format!("Item {i}"),
                    price: Price::from(100),
                },
                Quantity::new(*q).unwrap(),
            );
        }
        cart
    }

    fn remaining_ids(cart: &Cart) -> Vec<i64> {
        cart.entries().iter().map(|e| e.product.id.as_i64()).collect()
    }

    #[tokio::test]
    async fn test_checkout_places_every_line_and_empties_cart() {
        let sink = RecordingSink::default();
        let mut cart = cart(&[2, 1]);

        let report = checkout(&sink, &user(), &mut cart).await;

        assert!(report.is_complete());
        assert_eq!(report.placed, 2);
        assert!(cart.is_empty());
        let calls = sink.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|o| o.user_id == UserId::new(1)));
        assert_eq!(calls[0].quantity.get(), 2);
    }

    #[tokio::test]
    async fn test_failed_lines_stay_in_cart() {
        let sink = RecordingSink {
            fail_at: vec![1],
            ..RecordingSink::default()
        };
        let mut cart = cart(&[1, 1, 1]);

        let report = checkout(&sink, &user(), &mut cart).await;

        assert_eq!(report.placed, 2);
        assert_eq!(report.failures.len(), 1);
        assert!(!report.session_expired());
        assert_eq!(remaining_ids(&cart), vec![2]);
    }

    #[tokio::test]
    async fn test_unauthorized_stops_submission() {
        let sink = RecordingSink {
            unauthorized_at: Some(1),
            ..RecordingSink::default()
        };
        let mut cart = cart(&[1, 1, 1, 1]);

        let report = checkout(&sink, &user(), &mut cart).await;

        assert!(report.session_expired());
        assert_eq!(sink.calls.lock().unwrap().len(), 2);
        assert_eq!(remaining_ids(&cart), vec![2, 3, 4]);
        assert_eq!(report.remaining, 3);
    }

    #[tokio::test]
    async fn test_empty_cart_is_a_no_op() {
        let sink = RecordingSink::default();
        let mut cart = Cart::new();

        let report = checkout(&sink, &user(), &mut cart).await;

        assert!(report.is_complete());
        assert_eq!(report.placed, 0);
        assert!(sink.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_guard_refuses_concurrent_checkout_for_same_user() {
        let guard = CheckoutGuard::new();
        let alice = UserId::new(1);

        let permit = guard.try_begin(alice);
        assert!(permit.is_some());
        assert!(guard.try_begin(alice).is_none());
        assert!(guard.try_begin(UserId::new(2)).is_some());

        drop(permit);
        assert!(guard.try_begin(alice).is_some());
    }
}
