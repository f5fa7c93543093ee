//! Variant Model

use serde::{Deserialize, Serialize};

/// Variant entity (sellable SKU of a product)
///
/// `stock_quantity` is joined from the stock table; `None` means no stock row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Variant {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub sku: String,
    pub price: f64,
    pub stock_quantity: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Variant fields nested in a product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantInput {
    pub name: String,
    pub sku: String,
    pub price: f64,
}

/// Create variant payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantCreate {
    pub name: String,
    pub sku: String,
    pub price: f64,
    pub product_id: i64,
}

/// Update variant payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantUpdate {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub price: Option<f64>,
}

/// Variant list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sku: Option<String>,
    pub product_id: Option<i64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}
