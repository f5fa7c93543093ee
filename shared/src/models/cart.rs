//! Cart Model

use serde::{Deserialize, Serialize};

/// Cart lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum CartStatus {
    Active,
    CheckedOut,
}

/// Cart entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Cart {
    pub id: i64,
    pub user_id: i64,
    pub status: CartStatus,
    pub created_at: i64,
    pub updated_at: i64,

    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<CartItem>,
}

/// Cart line with the variant it points at
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CartItem {
    pub id: i64,
    pub cart_id: i64,
    pub variant_id: i64,
    pub quantity: i64,
    pub sku: String,
    pub variant_name: String,
    pub product_name: String,
    /// Current variant price
    pub price: f64,
    /// Current stock (0 when the variant has no stock row)
    pub available: i64,
}

/// Add / set cart item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    pub variant_id: i64,
    pub quantity: i64,
}
