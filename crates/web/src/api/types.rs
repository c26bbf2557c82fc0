//! Request and response types for the logistics backend.
//!
//! The backend speaks camelCase JSON. Responses are parsed leniently
//! (optional fields default, counts may arrive as strings) because the
//! backend is not consistent across endpoints.

use chrono::{DateTime, Utc};
use ldms_core::{
    AuthToken, OrderId, OrderStatus, Price, Quantity, Role, StockId, StockStatus, TransportId,
    UserId,
};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Users
// =============================================================================

/// Email and password submitted on the login form.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// Body of `POST /users/login`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: AuthToken,
    pub role: Role,
}

/// Body of `GET /users/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub role: Role,
    #[serde(default)]
    pub name: Option<String>,
}

/// A user account as listed by the admin endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// A new account, from self-registration or the admin user form.
#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub role: Role,
}

/// Changes to an existing account. An absent password keeps the current one.
#[derive(Debug)]
pub struct UserUpdate {
    pub name: String,
    pub email: String,
    pub password: Option<SecretString>,
    pub role: Role,
}

/// Wire form of a user write; the only place a password is exposed.
#[derive(Serialize)]
pub(super) struct UserBody<'a> {
    pub name: &'a str,
    pub email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
    pub role: Role,
}

/// A driver that orders can be assigned to.
#[derive(Debug, Clone, Deserialize)]
pub struct Driver {
    pub id: UserId,
    pub name: String,
}

// =============================================================================
// Stock
// =============================================================================

/// An inventory record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub id: StockId,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub upc: Option<String>,
    pub price: Price,
    #[serde(default, deserialize_with = "lenient_count")]
    pub in_stock: Option<i64>,
    #[serde(default)]
    pub total_value: Option<Price>,
    #[serde(default)]
    pub status: StockStatus,
    #[serde(default)]
    pub description: Option<String>,
    /// Base64-encoded JPEG.
    #[serde(default)]
    pub image: Option<String>,
}

impl Stock {
    /// `data:` URL for the product image, if there is one.
    #[must_use]
    pub fn image_src(&self) -> Option<String> {
        image_data_url(self.image.as_deref())
    }
}

/// Fields of the stock create/update form, sent as multipart.
#[derive(Debug, Default)]
pub struct StockForm {
    pub name: String,
    pub category: String,
    pub upc: String,
    pub price: String,
    pub in_stock: String,
    pub total_value: String,
    pub status: StockStatus,
    pub description: String,
    pub image: Option<ImageUpload>,
}

/// An uploaded image file.
#[derive(Debug)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl StockForm {
    /// Check the fields the backend needs to be numeric.
    ///
    /// # Errors
    ///
    /// Returns a message for the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name is required.".to_string());
        }
        if self.price.trim().parse::<rust_decimal::Decimal>().is_err() {
            return Err(format!("Price '{}' is not a number.", self.price));
        }
        if self.in_stock.trim().parse::<u64>().is_err() {
            return Err(format!("In stock '{}' is not a whole number.", self.in_stock));
        }
        if !self.total_value.trim().is_empty()
            && self.total_value.trim().parse::<rust_decimal::Decimal>().is_err()
        {
            return Err(format!("Total value '{}' is not a number.", self.total_value));
        }
        Ok(())
    }
}

// =============================================================================
// Orders
// =============================================================================

/// An order as returned by the order endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub product_id: Option<StockId>,
    #[serde(default)]
    pub product: Option<OrderProduct>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub driver_id: Option<UserId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order_accepted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order_packed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order_shipped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order_delivered_at: Option<DateTime<Utc>>,
}

/// Product details embedded in an order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderProduct {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Either a full URL or a `data:` URL.
    #[serde(default)]
    pub image: Option<String>,
}

impl Order {
    /// Name to show for the ordered product.
    #[must_use]
    pub fn product_name(&self) -> String {
        match (&self.product, self.product_id) {
            (Some(product), _) => product.name.clone(),
            (None, Some(id)) => format!("Product #{id}"),
            (None, None) => "Unknown product".to_string(),
        }
    }

    /// Creation date for listings, or an empty string.
    #[must_use]
    pub fn placed_on(&self) -> String {
        self.created_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }

    /// Whether `driver` is the assigned driver.
    #[must_use]
    pub fn is_assigned_to(&self, driver: &UserId) -> bool {
        self.driver_id.as_ref() == Some(driver)
    }

    /// When the order reached `stage`, if the backend recorded it.
    #[must_use]
    pub const fn reached_at(&self, stage: OrderStatus) -> Option<DateTime<Utc>> {
        match stage {
            OrderStatus::Created => self.created_at,
            OrderStatus::Accepted => self.order_accepted_at,
            OrderStatus::Packed => self.order_packed_at,
            OrderStatus::Shipped => self.order_shipped_at,
            OrderStatus::Delivered => self.order_delivered_at,
            OrderStatus::Cancelled => None,
        }
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub product_id: StockId,
    pub quantity: Quantity,
    pub user_id: UserId,
}

/// Body of `PUT /orders/:id/status`.
#[derive(Debug, Serialize)]
pub(super) struct StatusUpdate {
    pub status: OrderStatus,
}

/// Body of `PUT /orders/:id/assign`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DriverAssignment {
    pub driver_id: UserId,
}

// =============================================================================
// Admin
// =============================================================================

/// A transport record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transport {
    pub id: TransportId,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub driver_id: Option<UserId>,
    #[serde(default)]
    pub status: Option<String>,
}

/// One label/value line of a free-form backend summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub label: String,
    pub value: String,
}

/// Flatten a free-form JSON summary into display rows.
///
/// Objects become one row per key, arrays one row per element. A lone
/// `data` wrapper is unwrapped first.
#[must_use]
pub fn summary_rows(value: &serde_json::Value) -> Vec<SummaryRow> {
    use serde_json::Value;

    let value = match value {
        Value::Object(map) if map.len() == 1 => map.get("data").unwrap_or(value),
        _ => value,
    };

    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, v)| SummaryRow {
                label: key.clone(),
                value: display_value(v),
            })
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| SummaryRow {
                label: format!("#{}", i + 1),
                value: display_value(v),
            })
            .collect(),
        Value::Null => Vec::new(),
        other => vec![SummaryRow {
            label: "value".to_string(),
            value: display_value(other),
        }],
    }
}

fn display_value(value: &serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => format!("{} items", items.len()),
        other => other.to_string(),
    }
}

// =============================================================================
// Feedback
// =============================================================================

/// Body of `POST /feedbacks`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedback {
    pub user_id: UserId,
    pub message: String,
}

// =============================================================================
// Helpers
// =============================================================================

/// `data:` URL for a base64 image; values that already look like URLs pass
/// through unchanged.
#[must_use]
pub fn image_data_url(image: Option<&str>) -> Option<String> {
    let image = image?.trim();
    if image.is_empty() {
        None
    } else if image.starts_with("data:") || image.starts_with("http") {
        Some(image.to_string())
    } else {
        Some(format!("data:image/jpeg;base64,{image}"))
    }
}

/// Accepts a count sent either as a JSON number or a numeric string.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}
