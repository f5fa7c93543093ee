//! Sales Statistics Models

use serde::{Deserialize, Serialize};

use super::order::OrderStatus;
use super::user::UserSummary;

/// Period granularity for sales series
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SalesInterval {
    #[default]
    Day,
    Month,
}

/// Common statistics filters
///
/// Dates are RFC 3339 strings; `interval` and `limit` only apply to the
/// period and top-SKU reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category_id: Option<i64>,
    pub status: Option<OrderStatus>,
    pub interval: Option<SalesInterval>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewTotals {
    pub users: i64,
    pub orders: i64,
    pub revenue: f64,
    pub pending_orders: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StatusRevenue {
    pub status: OrderStatus,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CategoryProductCount {
    pub id: i64,
    pub name: String,
    pub product_count: i64,
}

/// Latest order with its customer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentOrder {
    pub id: i64,
    pub status: OrderStatus,
    pub total: f64,
    pub created_at: i64,
    pub user: UserSummary,
}

/// Admin dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub totals: OverviewTotals,
    pub revenue_by_status: Vec<StatusRevenue>,
    pub top_categories: Vec<CategoryProductCount>,
    pub recent_orders: Vec<RecentOrder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PeriodSales {
    pub period: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CategorySales {
    pub category_id: i64,
    pub category_name: String,
    pub quantity: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SkuSales {
    pub variant_id: i64,
    pub sku: String,
    pub name: String,
    pub product_name: String,
    pub quantity_sold: i64,
    pub revenue: f64,
}

/// Cart-to-checkout conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub carts: i64,
    pub orders: i64,
    pub conversion_rate: f64,
}
