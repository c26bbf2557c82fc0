//! Stock manager route handlers: inventory and order management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Path, State, multipart::MultipartError},
    response::{IntoResponse, Response},
};
use ldms_core::{OrderId, OrderStatus, StockId, StockStatus, UserId};
use serde::Deserialize;
use tracing::instrument;

use super::{action_result, page_data, redirect_with};
use crate::api::{Driver, ImageUpload, Order, Stock, StockForm};
use crate::error::{AppError, Result};
use crate::middleware::RequireStockManager;
use crate::models::{Chrome, Flash};
use crate::state::AppState;

const STOCKS_PATH: &str = "/stock-manager/stocks";
const ORDERS_PATH: &str = "/stock-manager/orders";

// =============================================================================
// View Types
// =============================================================================

/// Inventory counts shown on the dashboard.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StockSummary {
    pub total: usize,
    pub in_stock: usize,
    pub out_of_stock: usize,
}

impl StockSummary {
    fn from_stocks(stocks: &[Stock]) -> Self {
        let in_stock = stocks
            .iter()
            .filter(|s| s.status == StockStatus::InStock)
            .count();
        Self {
            total: stocks.len(),
            in_stock,
            out_of_stock: stocks.len() - in_stock,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Stock manager dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "stock_manager/dashboard.html")]
pub struct DashboardTemplate {
    pub chrome: Chrome,
    pub summary: StockSummary,
}

/// Stock management template.
#[derive(Template, WebTemplate)]
#[template(path = "stock_manager/stocks.html")]
pub struct StocksTemplate {
    pub chrome: Chrome,
    pub stocks: Vec<Stock>,
    pub statuses: [StockStatus; 2],
}

/// Order management template.
#[derive(Template, WebTemplate)]
#[template(path = "stock_manager/orders.html")]
pub struct OrdersTemplate {
    pub chrome: Chrome,
    pub orders: Vec<Order>,
    pub drivers: Vec<Driver>,
    pub statuses: [OrderStatus; 5],
}

// =============================================================================
// Form Types
// =============================================================================

/// Status change form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Driver assignment form data.
#[derive(Debug, Deserialize)]
pub struct AssignForm {
    pub driver_id: UserId,
}

/// Read the stock create/update form.
///
/// An empty file input means "keep the current image". The inner error is a
/// message for the visitor; the outer one means the body itself is broken.
async fn read_stock_form(
    mut multipart: Multipart,
) -> std::result::Result<std::result::Result<StockForm, String>, MultipartError> {
    let mut form = StockForm::default();
    let mut invalid = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await?;
            if !file_name.is_empty() && !bytes.is_empty() {
                form.image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            "name" => form.name = value,
            "category" => form.category = value,
            "upc" => form.upc = value,
            "price" => form.price = value,
            "in_stock" => form.in_stock = value,
            "total_value" => form.total_value = value,
            "status" => match value.parse() {
                Ok(status) => form.status = status,
                Err(_) => invalid = Some(format!("Status '{value}' is not valid.")),
            },
            "description" => form.description = value,
            other => tracing::debug!(field = other, "Ignoring unknown stock form field"),
        }
    }

    Ok(invalid.map_or(Ok(form), Err))
}

/// Parse and validate a submitted stock form.
async fn stock_form(multipart: Multipart) -> Result<std::result::Result<StockForm, String>> {
    let form = read_stock_form(multipart)
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?;
    Ok(form.and_then(|form| form.validate().map(|()| form)))
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the inventory summary.
#[instrument(skip_all)]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireStockManager(auth): RequireStockManager,
) -> Result<impl IntoResponse> {
    let stocks = page_data(
        &state,
        &auth.session,
        state.api().list_stocks(&auth.user.token).await,
    )
    .await?;

    Ok(DashboardTemplate {
        summary: StockSummary::from_stocks(&stocks),
        chrome: auth.chrome().await,
    })
}

/// Display the stock list with create and edit forms.
#[instrument(skip_all)]
pub async fn stocks(
    State(state): State<AppState>,
    RequireStockManager(auth): RequireStockManager,
) -> Result<impl IntoResponse> {
    let stocks = page_data(
        &state,
        &auth.session,
        state.api().list_stocks(&auth.user.token).await,
    )
    .await?;

    Ok(StocksTemplate {
        stocks,
        statuses: StockStatus::ALL,
        chrome: auth.chrome().await,
    })
}

/// Create a stock record.
#[instrument(skip_all)]
pub async fn create_stock(
    State(state): State<AppState>,
    RequireStockManager(auth): RequireStockManager,
    multipart: Multipart,
) -> Result<Response> {
    let form = match stock_form(multipart).await? {
        Ok(form) => form,
        Err(message) => {
            return Ok(redirect_with(&auth.session, Flash::error(message), STOCKS_PATH).await);
        }
    };

    let name = form.name.clone();
    let result = state.api().create_stock(&auth.user.token, form).await;
    Ok(action_result(
        &state,
        &auth.session,
        result,
        &format!("Added {name}."),
        STOCKS_PATH,
    )
    .await)
}

/// Update a stock record.
#[instrument(skip_all, fields(stock_id = %id))]
pub async fn update_stock(
    State(state): State<AppState>,
    RequireStockManager(auth): RequireStockManager,
    Path(id): Path<StockId>,
    multipart: Multipart,
) -> Result<Response> {
    let form = match stock_form(multipart).await? {
        Ok(form) => form,
        Err(message) => {
            return Ok(redirect_with(&auth.session, Flash::error(message), STOCKS_PATH).await);
        }
    };

    let name = form.name.clone();
    let result = state.api().update_stock(&auth.user.token, id, form).await;
    Ok(action_result(
        &state,
        &auth.session,
        result,
        &format!("Updated {name}."),
        STOCKS_PATH,
    )
    .await)
}

/// Delete a stock record.
#[instrument(skip_all, fields(stock_id = %id))]
pub async fn delete_stock(
    State(state): State<AppState>,
    RequireStockManager(auth): RequireStockManager,
    Path(id): Path<StockId>,
) -> Response {
    let result = state.api().delete_stock(&auth.user.token, id).await;
    action_result(
        &state,
        &auth.session,
        result,
        "Stock deleted.",
        STOCKS_PATH,
    )
    .await
}

/// Display all orders with their management actions.
#[instrument(skip_all)]
pub async fn orders(
    State(state): State<AppState>,
    RequireStockManager(auth): RequireStockManager,
) -> Result<impl IntoResponse> {
    let (orders, drivers) = tokio::join!(
        state.api().list_orders(&auth.user.token),
        state.api().list_drivers(&auth.user.token),
    );
    let orders = page_data(&state, &auth.session, orders).await?;
    let drivers = page_data(&state, &auth.session, drivers).await?;

    Ok(OrdersTemplate {
        orders,
        drivers,
        statuses: OrderStatus::ASSIGNABLE,
        chrome: auth.chrome().await,
    })
}

/// Accept a newly created order.
#[instrument(skip_all, fields(order_id = %id))]
pub async fn accept_order(
    State(state): State<AppState>,
    RequireStockManager(auth): RequireStockManager,
    Path(id): Path<OrderId>,
) -> Response {
    let result = state
        .api()
        .update_order_status(&auth.user.token, id, OrderStatus::Accepted)
        .await;
    action_result(
        &state,
        &auth.session,
        result,
        &format!("Order #{id} accepted."),
        ORDERS_PATH,
    )
    .await
}

/// Move an order to another status.
#[instrument(skip_all, fields(order_id = %id, status = %form.status))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireStockManager(auth): RequireStockManager,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Response {
    let status = match form.status.parse::<OrderStatus>() {
        Ok(status) => status,
        Err(message) => {
            return redirect_with(&auth.session, Flash::error(message), ORDERS_PATH).await;
        }
    };

    let result = state
        .api()
        .update_order_status(&auth.user.token, id, status)
        .await;
    action_result(
        &state,
        &auth.session,
        result,
        &format!("Order #{id} is now {status}."),
        ORDERS_PATH,
    )
    .await
}

/// Assign an order to a driver.
#[instrument(skip_all, fields(order_id = %id, driver_id = %form.driver_id))]
pub async fn assign_driver(
    State(state): State<AppState>,
    RequireStockManager(auth): RequireStockManager,
    Path(id): Path<OrderId>,
    Form(form): Form<AssignForm>,
) -> Response {
    let result = state
        .api()
        .assign_order(&auth.user.token, id, form.driver_id)
        .await;
    action_result(
        &state,
        &auth.session,
        result,
        &format!("Order #{id} assigned."),
        ORDERS_PATH,
    )
    .await
}

/// Delete an order.
#[instrument(skip_all, fields(order_id = %id))]
pub async fn delete_order(
    State(state): State<AppState>,
    RequireStockManager(auth): RequireStockManager,
    Path(id): Path<OrderId>,
) -> Response {
    let result = state.api().delete_order(&auth.user.token, id).await;
    action_result(
        &state,
        &auth.session,
        result,
        &format!("Order #{id} deleted."),
        ORDERS_PATH,
    )
    .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{Request, header::CONTENT_TYPE};
    use ldms_core::Price;

    use super::*;

    /// Multipart body built from `(name, file name, value)` parts.
    async fn multipart(parts: &[(&str, Option<&str>, &str)]) -> Multipart {
        let mut body = String::new();
        for (name, file_name, value) in parts {
            body.push_str("--BOUNDARY\r\n");
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: image/png\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str("--BOUNDARY--\r\n");

        let request = Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "multipart/form-data; boundary=BOUNDARY")
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    const FIELDS: [(&str, Option<&str>, &str); 4] = [
        ("name", None, "Widget"),
        ("price", None, "100"),
        ("in_stock", None, "5"),
        ("status", None, "Out of stock"),
    ];

    #[tokio::test]
    async fn test_empty_file_input_keeps_image() {
        let mut parts = FIELDS.to_vec();
        parts.push(("image", Some(""), ""));

        let form = read_stock_form(multipart(&parts).await).await.unwrap().unwrap();
        assert_eq!(form.name, "Widget");
        assert_eq!(form.in_stock, "5");
        assert_eq!(form.status, StockStatus::OutOfStock);
        assert!(form.image.is_none());
    }

    #[tokio::test]
    async fn test_uploaded_image_is_kept() {
        let mut parts = FIELDS.to_vec();
        parts.push(("image", Some("widget.png"), "PNG"));

        let form = read_stock_form(multipart(&parts).await).await.unwrap().unwrap();
        let image = form.image.unwrap();
        assert_eq!(image.file_name, "widget.png");
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.bytes, b"PNG");
    }

    #[tokio::test]
    async fn test_unknown_stock_status_is_refused() {
        let mut parts = FIELDS.to_vec();
        parts[3] = ("status", None, "Discontinued");

        let result = read_stock_form(multipart(&parts).await).await.unwrap();
        assert_eq!(result.unwrap_err(), "Status 'Discontinued' is not valid.");
    }

    #[tokio::test]
    async fn test_stock_form_runs_validation() {
        let mut parts = FIELDS.to_vec();
        parts[1] = ("price", None, "cheap");

        let result = stock_form(multipart(&parts).await).await.unwrap();
        assert_eq!(result.unwrap_err(), "Price 'cheap' is not a number.");
    }

    fn stock(id: i64, status: StockStatus) -> Stock {
        Stock {
            id: StockId::new(id),
            name: format!("Item {id}"),
            category: None,
            upc: None,
            price: Price::from(10),
            in_stock: Some(1),
            total_value: None,
            status,
            description: None,
            image: None,
        }
    }

    #[test]
    fn test_stock_summary_counts_statuses() {
        let stocks = [
            stock(1, StockStatus::InStock),
            stock(2, StockStatus::OutOfStock),
            stock(3, StockStatus::InStock),
        ];

        assert_eq!(
            StockSummary::from_stocks(&stocks),
            StockSummary {
                total: 3,
                in_stock: 2,
                out_of_stock: 1,
            }
        );
    }

    #[test]
    fn test_empty_inventory_summary() {
        assert_eq!(StockSummary::from_stocks(&[]), StockSummary::default());
    }
}
