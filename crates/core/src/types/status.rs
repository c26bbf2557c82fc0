//! Status enums for orders and stock records.
//!
//! Transitions are enforced by the backend; these types only name the
//! states and know how to present the order lifecycle.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// ```text
/// Created -> Accepted -> Packed -> Shipped -> Delivered
///     \________________________________________/
///                      Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Order Created")]
    Created,
    #[serde(rename = "Order Accepted")]
    Accepted,
    #[serde(rename = "Order Packed")]
    Packed,
    #[serde(rename = "Order Shipped")]
    Shipped,
    #[serde(rename = "Order Delivered", alias = "Delivered")]
    Delivered,
    #[serde(rename = "Order Cancelled", alias = "Cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// Tracking stages in lifecycle order. `Cancelled` is not a stage.
    pub const STAGES: [Self; 5] = [
        Self::Created,
        Self::Accepted,
        Self::Packed,
        Self::Shipped,
        Self::Delivered,
    ];

    /// Statuses a stock manager may set by hand.
    pub const ASSIGNABLE: [Self; 5] = [
        Self::Accepted,
        Self::Packed,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Wire name used by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "Order Created",
            Self::Accepted => "Order Accepted",
            Self::Packed => "Order Packed",
            Self::Shipped => "Order Shipped",
            Self::Delivered => "Order Delivered",
            Self::Cancelled => "Order Cancelled",
        }
    }

    /// Position in [`Self::STAGES`], or `None` for a cancelled order.
    #[must_use]
    pub fn stage_index(self) -> Option<usize> {
        Self::STAGES.iter().position(|stage| *stage == self)
    }

    /// Tracking progress in percent.
    #[must_use]
    pub fn progress_percent(self) -> u8 {
        match self.stage_index() {
            // 5 stages, so each one is worth 20%
            Some(index) => u8::try_from((index + 1) * 20).unwrap_or(100),
            None => 0,
        }
    }

    /// Whether the order has reached a terminal state.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cancelled" => return Ok(Self::Cancelled),
            "Delivered" => return Ok(Self::Delivered),
            _ => {}
        }
        Self::STAGES
            .into_iter()
            .chain([Self::Cancelled])
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// Stock availability status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StockStatus {
    #[default]
    #[serde(rename = "In-Stock")]
    InStock,
    #[serde(rename = "Out of stock")]
    OutOfStock,
}

impl StockStatus {
    /// Both statuses, in form order.
    pub const ALL: [Self; 2] = [Self::InStock, Self::OutOfStock];

    /// Wire name used by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InStock => "In-Stock",
            Self::OutOfStock => "Out of stock",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "In-Stock" => Ok(Self::InStock),
            "Out of stock" => Ok(Self::OutOfStock),
            _ => Err(format!("invalid stock status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_per_stage() {
        let progress: Vec<u8> = OrderStatus::STAGES
            .iter()
            .map(|s| s.progress_percent())
            .collect();
        assert_eq!(progress, vec![20, 40, 60, 80, 100]);
        assert_eq!(OrderStatus::Cancelled.progress_percent(), 0);
    }

    #[test]
    fn test_cancelled_accepts_both_wire_names() {
        let short: OrderStatus = serde_json::from_str("\"Cancelled\"").expect("short form");
        let long: OrderStatus = serde_json::from_str("\"Order Cancelled\"").expect("long form");
        assert_eq!(short, OrderStatus::Cancelled);
        assert_eq!(long, OrderStatus::Cancelled);
        assert_eq!("Cancelled".parse::<OrderStatus>(), Ok(OrderStatus::Cancelled));
    }

    #[test]
    fn test_status_round_trips_through_form_value() {
        for status in OrderStatus::ASSIGNABLE {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert!("Lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_final_states() {
        assert!(OrderStatus::Delivered.is_final());
        assert!(OrderStatus::Cancelled.is_final());
        assert!(!OrderStatus::Shipped.is_final());
    }

    #[test]
    fn test_stock_status_wire_names() {
        let status: StockStatus = serde_json::from_str("\"Out of stock\"").expect("valid");
        assert_eq!(status, StockStatus::OutOfStock);
        assert_eq!("In-Stock".parse::<StockStatus>(), Ok(StockStatus::InStock));
    }
}
