//! Payment & Checkout Models

use serde::{Deserialize, Serialize};

use super::order::OrderStatus;

/// Payment intent status as reported by the provider
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
    Canceled,
}

/// Payment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub amount: f64,
    pub currency: String,
    pub provider: String,
    pub intent_id: String,
    pub status: PaymentStatus,
    /// Checkout context (`shippingMethod`, `note`)
    #[cfg_attr(feature = "db", sqlx(json))]
    pub metadata: serde_json::Value,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Checkout payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub shipping_method: Option<String>,
    pub note: Option<String>,
}

/// Price breakdown of a checkout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountBreakdown {
    pub subtotal: f64,
    pub tax: f64,
    pub shipping: f64,
    pub total: f64,
}

/// Checkout result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order_id: i64,
    pub order_status: OrderStatus,
    pub payment_intent_id: String,
    pub payment_status: PaymentStatus,
    pub amount: AmountBreakdown,
}

/// Provider callback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub intent_id: String,
    pub status: PaymentStatus,
}
