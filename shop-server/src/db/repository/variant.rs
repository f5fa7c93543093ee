//! Variant Repository

use shared::PageQuery;
use shared::models::{Variant, VariantCreate, VariantUpdate};
use sqlx::SqlitePool;

use super::{RepoError, RepoResult, to_total};

/// Variant columns plus the joined stock quantity
pub(crate) const SELECT_VARIANT: &str = "SELECT v.id, v.product_id, v.name, v.sku, v.price,
        s.quantity AS stock_quantity, v.created_at, v.updated_at
     FROM variant v LEFT JOIN stock s ON s.variant_id = v.id";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Variant>> {
    let variant = sqlx::query_as::<_, Variant>(&format!("{SELECT_VARIANT} WHERE v.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(variant)
}

/// Variants of one product, by id
pub async fn find_by_product(pool: &SqlitePool, product_id: i64) -> RepoResult<Vec<Variant>> {
    let variants = sqlx::query_as::<_, Variant>(&format!(
        "{SELECT_VARIANT} WHERE v.product_id = ? ORDER BY v.id"
    ))
    .bind(product_id)
    .fetch_all(pool)
    .await?;
    Ok(variants)
}

/// Variants filtered by SKU substring, product and price range, newest first
pub async fn list(
    pool: &SqlitePool,
    sku: Option<&str>,
    product_id: Option<i64>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    page: &PageQuery,
) -> RepoResult<(Vec<Variant>, u64)> {
    const FILTER: &str = "WHERE (?1 IS NULL OR v.sku LIKE ?1)
          AND (?2 IS NULL OR v.product_id = ?2)
          AND (?3 IS NULL OR v.price >= ?3)
          AND (?4 IS NULL OR v.price <= ?4)";
    let pattern = sku.map(|s| format!("%{s}%"));

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM variant v {FILTER}"))
        .bind(&pattern)
        .bind(product_id)
        .bind(min_price)
        .bind(max_price)
        .fetch_one(pool)
        .await?;

    let variants = sqlx::query_as::<_, Variant>(&format!(
        "{SELECT_VARIANT} {FILTER} ORDER BY v.created_at DESC, v.id DESC LIMIT ?5 OFFSET ?6"
    ))
    .bind(&pattern)
    .bind(product_id)
    .bind(min_price)
    .bind(max_price)
    .bind(i64::from(page.limit()))
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok((variants, to_total(total)))
}

pub async fn create(pool: &SqlitePool, data: &VariantCreate, now: i64) -> RepoResult<Variant> {
    let product: Option<i64> = sqlx::query_scalar("SELECT id FROM product WHERE id = ?")
        .bind(data.product_id)
        .fetch_optional(pool)
        .await?;
    if product.is_none() {
        return Err(RepoError::NotFound(format!(
            "Product {} not found",
            data.product_id
        )));
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO variant (product_id, name, sku, price, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(data.product_id)
    .bind(&data.name)
    .bind(&data.sku)
    .bind(data.price)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| sku_conflict(e, &data.sku))?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create variant".to_string()))
}

/// Partial update; absent fields keep their value
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &VariantUpdate,
    now: i64,
) -> RepoResult<Variant> {
    let result = sqlx::query(
        "UPDATE variant SET
             name = COALESCE(?, name),
             sku = COALESCE(?, sku),
             price = COALESCE(?, price),
             updated_at = ?
         WHERE id = ?",
    )
    .bind(&data.name)
    .bind(&data.sku)
    .bind(data.price)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| sku_conflict(e, data.sku.as_deref().unwrap_or_default()))?;

    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Variant {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Variant {id} not found")))
}

pub(crate) fn sku_conflict(err: sqlx::Error, sku: &str) -> RepoError {
    match RepoError::from(err) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!("SKU '{sku}' already exists")),
        other => other,
    }
}
