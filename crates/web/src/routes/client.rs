//! Client route handlers: dashboard, product browsing, orders, feedback.
//!
//! The cart lives in [`super::cart`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use ldms_core::{OrderId, OrderStatus};
use serde::Deserialize;
use tracing::instrument;

use super::{action_failed, action_result, cart, page_data, redirect_with};
use crate::api::{NewFeedback, Order, Stock};
use crate::error::{AppError, Result};
use crate::middleware::RequireClient;
use crate::models::{Chrome, Flash};
use crate::state::AppState;

const ORDERS_PATH: &str = "/client/orders";
const FEEDBACK_PATH: &str = "/client/feedback";

// =============================================================================
// View Types
// =============================================================================

/// Order counts shown on the dashboard.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct OrderSummary {
    pub total: usize,
    pub active: usize,
    pub delivered: usize,
    pub cancelled: usize,
}

impl OrderSummary {
    fn from_orders(orders: &[Order]) -> Self {
        orders.iter().fold(Self::default(), |mut summary, order| {
            summary.total += 1;
            match order.status {
                OrderStatus::Delivered => summary.delivered += 1,
                OrderStatus::Cancelled => summary.cancelled += 1,
                _ => summary.active += 1,
            }
            summary
        })
    }
}

/// One step of the tracking timeline.
#[derive(Debug)]
pub struct StageView {
    pub name: &'static str,
    pub reached: bool,
    pub at: Option<String>,
}

fn stage_views(order: &Order) -> Vec<StageView> {
    let current = order.status.stage_index();
    OrderStatus::STAGES
        .iter()
        .enumerate()
        .map(|(i, stage)| StageView {
            name: stage.as_str(),
            reached: current.is_some_and(|c| i <= c),
            at: order
                .reached_at(*stage)
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string()),
        })
        .collect()
}

// =============================================================================
// Templates
// =============================================================================

/// Client dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "client/dashboard.html")]
pub struct DashboardTemplate {
    pub chrome: Chrome,
    pub summary: OrderSummary,
    pub recent: Vec<Order>,
    pub cart_lines: usize,
}

/// Product list template.
#[derive(Template, WebTemplate)]
#[template(path = "client/products.html")]
pub struct ProductsTemplate {
    pub chrome: Chrome,
    pub stocks: Vec<Stock>,
}

/// My orders template.
#[derive(Template, WebTemplate)]
#[template(path = "client/orders.html")]
pub struct OrdersTemplate {
    pub chrome: Chrome,
    pub orders: Vec<Order>,
}

/// Order tracking template.
#[derive(Template, WebTemplate)]
#[template(path = "client/track.html")]
pub struct TrackTemplate {
    pub chrome: Chrome,
    pub order: Order,
    pub stages: Vec<StageView>,
    pub progress: u8,
}

/// Feedback form template.
#[derive(Template, WebTemplate)]
#[template(path = "client/feedback.html")]
pub struct FeedbackTemplate {
    pub chrome: Chrome,
}

/// Feedback form data.
#[derive(Debug, Deserialize)]
pub struct FeedbackForm {
    pub message: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Number of orders listed on the dashboard.
const RECENT_ORDERS: usize = 5;

/// Display the client dashboard.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireClient(auth): RequireClient,
) -> Result<impl IntoResponse> {
    let orders = page_data(
        &state,
        &auth.session,
        state.api().list_user_orders(&auth.user.token, auth.user.id).await,
    )
    .await?;
    let cart = cart::load(&auth.session).await?;

    Ok(DashboardTemplate {
        summary: OrderSummary::from_orders(&orders),
        recent: orders.into_iter().rev().take(RECENT_ORDERS).collect(),
        cart_lines: cart.len(),
        chrome: auth.chrome().await,
    })
}

/// Display products available to order.
#[instrument(skip_all)]
pub async fn products(
    State(state): State<AppState>,
    RequireClient(auth): RequireClient,
) -> Result<impl IntoResponse> {
    let stocks = page_data(
        &state,
        &auth.session,
        state.api().list_stocks(&auth.user.token).await,
    )
    .await?;

    Ok(ProductsTemplate {
        stocks,
        chrome: auth.chrome().await,
    })
}

/// Display the client's orders.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireClient(auth): RequireClient,
) -> Result<impl IntoResponse> {
    let orders = page_data(
        &state,
        &auth.session,
        state.api().list_user_orders(&auth.user.token, auth.user.id).await,
    )
    .await?;

    Ok(OrdersTemplate {
        orders,
        chrome: auth.chrome().await,
    })
}

/// Display tracking for one of the client's orders.
///
/// Delivered and cancelled orders have nothing left to track.
#[instrument(skip_all, fields(user_id = %auth.user.id, order_id = %id))]
pub async fn track(
    State(state): State<AppState>,
    RequireClient(auth): RequireClient,
    Path(id): Path<OrderId>,
) -> Result<Response> {
    let order = match state.api().get_order(&auth.user.token, id).await {
        Ok(order) => order,
        Err(e) if e.is_unauthorized() => {
            return Ok(action_failed(&state, &auth.session, &e, ORDERS_PATH).await);
        }
        Err(e) => return Err(e.into()),
    };

    if order.user_id.is_some_and(|owner| owner != auth.user.id) {
        return Err(AppError::NotFound(format!("order {id}")));
    }

    if order.status.is_final() {
        return Ok(redirect_with(
            &auth.session,
            Flash::info(format!("Order #{id} is {}.", order.status)),
            ORDERS_PATH,
        )
        .await);
    }

    Ok(TrackTemplate {
        stages: stage_views(&order),
        progress: order.status.progress_percent(),
        order,
        chrome: auth.chrome().await,
    }
    .into_response())
}

/// Cancel one of the client's orders.
#[instrument(skip_all, fields(user_id = %auth.user.id, order_id = %id))]
pub async fn cancel(
    State(state): State<AppState>,
    RequireClient(auth): RequireClient,
    Path(id): Path<OrderId>,
) -> Response {
    let result = state.api().cancel_order(&auth.user.token, id).await;
    action_result(
        &state,
        &auth.session,
        result,
        &format!("Order #{id} cancelled."),
        ORDERS_PATH,
    )
    .await
}

/// Display the feedback form.
pub async fn feedback_page(RequireClient(auth): RequireClient) -> impl IntoResponse {
    FeedbackTemplate {
        chrome: auth.chrome().await,
    }
}

/// Submit feedback.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn submit_feedback(
    State(state): State<AppState>,
    RequireClient(auth): RequireClient,
    Form(form): Form<FeedbackForm>,
) -> Response {
    let message = form.message.trim();
    if message.is_empty() {
        return redirect_with(
            &auth.session,
            Flash::error("Please enter a message."),
            FEEDBACK_PATH,
        )
        .await;
    }

    let feedback = NewFeedback {
        user_id: auth.user.id,
        message: message.to_string(),
    };
    let result = state.api().submit_feedback(&auth.user.token, &feedback).await;
    action_result(
        &state,
        &auth.session,
        result,
        "Thank you for your feedback.",
        FEEDBACK_PATH,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: i64, status: OrderStatus) -> Order {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "productId": 7,
            "quantity": 1,
            "status": status.as_str(),
            "userId": 1,
        }))
        .unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn test_order_summary_counts_by_status() {
        let orders = [
            order(1, OrderStatus::Created),
            order(2, OrderStatus::Shipped),
            order(3, OrderStatus::Delivered),
            order(4, OrderStatus::Cancelled),
        ];

        assert_eq!(
            OrderSummary::from_orders(&orders),
            OrderSummary {
                total: 4,
                active: 2,
                delivered: 1,
                cancelled: 1,
            }
        );
    }

    #[test]
    fn test_stage_views_mark_reached_stages() {
        let stages = stage_views(&order(1, OrderStatus::Packed));
        let reached: Vec<bool> = stages.iter().map(|s| s.reached).collect();
        assert_eq!(reached, vec![true, true, true, false, false]);
        assert_eq!(stages[0].name, "Order Created");
    }
}
