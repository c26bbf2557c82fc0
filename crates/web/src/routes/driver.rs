//! Driver route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use ldms_core::OrderId;
use tracing::instrument;

use super::{action_result, page_data};
use crate::api::Order;
use crate::error::Result;
use crate::middleware::RequireDriver;
use crate::models::Chrome;
use crate::state::AppState;

const DASHBOARD_PATH: &str = "/driver";

/// Driver deliveries template.
#[derive(Template, WebTemplate)]
#[template(path = "driver/dashboard.html")]
pub struct DashboardTemplate {
    pub chrome: Chrome,
    /// Orders still to deliver.
    pub pending: Vec<Order>,
    /// Orders already delivered or cancelled.
    pub done: Vec<Order>,
}

/// Display the orders assigned to the driver.
#[instrument(skip_all, fields(driver_id = %auth.user.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireDriver(auth): RequireDriver,
) -> Result<impl IntoResponse> {
    let orders = page_data(
        &state,
        &auth.session,
        state
            .api()
            .list_driver_orders(&auth.user.token, auth.user.id)
            .await,
    )
    .await?;
    let (done, pending): (Vec<Order>, Vec<Order>) =
        orders.into_iter().partition(|o| o.status.is_final());

    Ok(DashboardTemplate {
        pending,
        done,
        chrome: auth.chrome().await,
    })
}

/// Mark an assigned order delivered.
#[instrument(skip_all, fields(driver_id = %auth.user.id, order_id = %id))]
pub async fn mark_delivered(
    State(state): State<AppState>,
    RequireDriver(auth): RequireDriver,
    Path(id): Path<OrderId>,
) -> Response {
    let result = state.api().mark_order_delivered(&auth.user.token, id).await;
    action_result(
        &state,
        &auth.session,
        result,
        &format!("Order #{id} marked as delivered."),
        DASHBOARD_PATH,
    )
    .await
}
