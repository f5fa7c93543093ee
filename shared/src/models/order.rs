//! Order Model

use serde::{Deserialize, Serialize};

use super::payment::Payment;

/// Order lifecycle
///
/// `Pending` only for directly created orders; checkout starts at
/// `PaymentPending` and a payment webhook moves it to `Paid` or
/// `PaymentFailed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderStatus {
    Pending,
    PaymentPending,
    Paid,
    PaymentFailed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::PaymentPending => "PAYMENT_PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::PaymentFailed => "PAYMENT_FAILED",
        }
    }

    /// No payment outcome moves an order out of these states
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::PaymentFailed)
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    pub total: f64,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<OrderStatusHistory>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
}

/// Order line, priced at creation time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub variant_id: i64,
    pub quantity: i64,
    /// Unit price snapshot
    pub price: f64,
    pub sku: String,
    pub variant_name: String,
}

/// Append-only status history entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderStatusHistory {
    pub id: i64,
    pub order_id: i64,
    pub status: OrderStatus,
    /// `None` when changed by the payment provider
    pub changed_by: Option<i64>,
    pub created_at: i64,
}

/// Requested order line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub variant_id: i64,
    pub quantity: i64,
}

/// Direct order creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: Option<i64>,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    pub status: Option<OrderStatus>,
}

/// Order list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<OrderStatus>,
    pub user_id: Option<i64>,
}
