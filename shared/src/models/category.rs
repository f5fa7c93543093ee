//! Category Model

use serde::{Deserialize, Serialize};

use super::product::Product;

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Category with its products
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub products: Vec<Product>,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

/// Update category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

/// Category list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}
