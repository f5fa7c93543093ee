//! Stock & Stock Movement Models

use serde::{Deserialize, Serialize};

/// Why a stock quantity changed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum MovementReason {
    /// Reserved by a cart checkout
    Checkout,
    /// Reserved by a directly created order
    OrderCreated,
    /// Administrative overwrite
    ManualAdjust,
}

/// Stock row joined with its variant and product names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Stock {
    pub id: i64,
    pub variant_id: i64,
    pub quantity: i64,
    pub location: Option<String>,
    pub sku: String,
    pub variant_name: String,
    pub product_name: String,
    pub updated_at: i64,
}

/// Append-only stock movement (audit ledger)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StockMovement {
    pub id: i64,
    pub variant_id: i64,
    pub order_id: Option<i64>,
    /// Signed delta (`new_quantity - previous_quantity`)
    pub change: i64,
    pub previous_quantity: i64,
    pub new_quantity: i64,
    pub reason: MovementReason,
    pub created_at: i64,
}

/// Manual stock adjustment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockRequest {
    pub variant_id: i64,
    pub quantity: i64,
    pub location: Option<String>,
}

/// Stock list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

/// Movement list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub variant_id: Option<i64>,
}
