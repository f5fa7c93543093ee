//! Stock Repository
//!
//! Reads go through the pool; every write takes the caller's transaction so
//! quantity changes and their movement rows commit together.

use shared::PageQuery;
use shared::models::{MovementReason, Stock, StockMovement};
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::{RepoResult, to_total};

const SELECT_STOCK: &str = "SELECT s.id, s.variant_id, s.quantity, s.location,
        v.sku, v.name AS variant_name, p.name AS product_name, s.updated_at
     FROM stock s
     JOIN variant v ON v.id = s.variant_id
     JOIN product p ON p.id = v.product_id";

pub async fn find_by_variant(pool: &SqlitePool, variant_id: i64) -> RepoResult<Option<Stock>> {
    let stock = sqlx::query_as::<_, Stock>(&format!("{SELECT_STOCK} WHERE s.variant_id = ?"))
        .bind(variant_id)
        .fetch_optional(pool)
        .await?;
    Ok(stock)
}

/// Stock rows matching `search` (variant name or SKU), latest update first
pub async fn list(
    pool: &SqlitePool,
    search: Option<&str>,
    page: &PageQuery,
) -> RepoResult<(Vec<Stock>, u64)> {
    const FILTER: &str = "WHERE (?1 IS NULL OR v.name LIKE ?1 OR v.sku LIKE ?1)";
    let pattern = search.map(|s| format!("%{s}%"));

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM stock s JOIN variant v ON v.id = s.variant_id {FILTER}"
    ))
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query_as::<_, Stock>(&format!(
        "{SELECT_STOCK} {FILTER} ORDER BY s.updated_at DESC, s.id DESC LIMIT ?2 OFFSET ?3"
    ))
    .bind(&pattern)
    .bind(i64::from(page.limit()))
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok((rows, to_total(total)))
}

/// Movements, newest first, optionally for one variant
pub async fn movements(
    pool: &SqlitePool,
    variant_id: Option<i64>,
    page: &PageQuery,
) -> RepoResult<(Vec<StockMovement>, u64)> {
    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM stock_movement WHERE (?1 IS NULL OR variant_id = ?1)")
            .bind(variant_id)
            .fetch_one(pool)
            .await?;

    let rows = sqlx::query_as::<_, StockMovement>(
        "SELECT * FROM stock_movement
         WHERE (?1 IS NULL OR variant_id = ?1)
         ORDER BY created_at DESC, id DESC
         LIMIT ?2 OFFSET ?3",
    )
    .bind(variant_id)
    .bind(i64::from(page.limit()))
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok((rows, to_total(total)))
}

/// Decrement by `quantity` only if enough is on hand; returns the new quantity
pub async fn decrement_if_available(
    tx: &mut Transaction<'_, Sqlite>,
    variant_id: i64,
    quantity: i64,
    now: i64,
) -> RepoResult<Option<i64>> {
    let remaining: Option<i64> = sqlx::query_scalar(
        "UPDATE stock SET quantity = quantity - ?1, updated_at = ?2
         WHERE variant_id = ?3 AND quantity >= ?1
         RETURNING quantity",
    )
    .bind(quantity)
    .bind(now)
    .bind(variant_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(remaining)
}

/// Current quantity; 0 when the variant has no stock row
pub async fn quantity(tx: &mut Transaction<'_, Sqlite>, variant_id: i64) -> RepoResult<i64> {
    let quantity: Option<i64> =
        sqlx::query_scalar("SELECT quantity FROM stock WHERE variant_id = ?")
            .bind(variant_id)
            .fetch_optional(&mut **tx)
            .await?;
    Ok(quantity.unwrap_or(0))
}

/// Lock the row by touching it and return its quantity (`None` if missing)
pub async fn touch(
    tx: &mut Transaction<'_, Sqlite>,
    variant_id: i64,
    now: i64,
) -> RepoResult<Option<i64>> {
    let quantity: Option<i64> = sqlx::query_scalar(
        "UPDATE stock SET updated_at = ? WHERE variant_id = ? RETURNING quantity",
    )
    .bind(now)
    .bind(variant_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(quantity)
}

/// Overwrite the quantity, creating the row when missing
///
/// A `None` location keeps the stored one.
pub async fn set_quantity(
    tx: &mut Transaction<'_, Sqlite>,
    variant_id: i64,
    quantity: i64,
    location: Option<&str>,
    now: i64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO stock (variant_id, quantity, location, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)
         ON CONFLICT(variant_id) DO UPDATE SET
             quantity = excluded.quantity,
             location = COALESCE(excluded.location, stock.location),
             updated_at = excluded.updated_at",
    )
    .bind(variant_id)
    .bind(quantity)
    .bind(location)
    .bind(now)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Append one movement row
#[allow(clippy::too_many_arguments)]
pub async fn insert_movement(
    tx: &mut Transaction<'_, Sqlite>,
    variant_id: i64,
    order_id: Option<i64>,
    change: i64,
    previous_quantity: i64,
    new_quantity: i64,
    reason: MovementReason,
    now: i64,
) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO stock_movement
             (variant_id, order_id, change, previous_quantity, new_quantity, reason, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(variant_id)
    .bind(order_id)
    .bind(change)
    .bind(previous_quantity)
    .bind(new_quantity)
    .bind(reason)
    .bind(now)
    .fetch_one(&mut **tx)
    .await?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{memory_pool, seed_variant};

    #[tokio::test]
    async fn test_list_and_search() {
        let pool = memory_pool().await;
        seed_variant(&pool, "HAT-RED", 10.0, 3).await;
        seed_variant(&pool, "SCARF", 15.0, 0).await;

        let (rows, total) = list(&pool, None, &PageQuery::default()).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(rows.len(), 2);

        let (rows, total) = list(&pool, Some("hat"), &PageQuery::default()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].sku, "HAT-RED");
        assert_eq!(rows[0].quantity, 3);
        assert_eq!(rows[0].product_name, "Product HAT-RED");
    }

    #[tokio::test]
    async fn test_decrement_never_goes_negative() {
        let pool = memory_pool().await;
        let variant_id = seed_variant(&pool, "HAT", 10.0, 3).await;

        let mut tx = pool.begin().await.unwrap();
        assert_eq!(decrement_if_available(&mut tx, variant_id, 2, 1).await.unwrap(), Some(1));
        assert_eq!(decrement_if_available(&mut tx, variant_id, 2, 1).await.unwrap(), None);
        assert_eq!(quantity(&mut tx, variant_id).await.unwrap(), 1);
        assert_eq!(decrement_if_available(&mut tx, variant_id + 99, 1, 1).await.unwrap(), None);
        assert_eq!(quantity(&mut tx, variant_id + 99).await.unwrap(), 0);
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_set_quantity_keeps_location() {
        let pool = memory_pool().await;
        let variant_id = seed_variant(&pool, "HAT", 10.0, 3).await;

        let mut tx = pool.begin().await.unwrap();
        set_quantity(&mut tx, variant_id, 8, Some("A-1"), 1).await.unwrap();
        set_quantity(&mut tx, variant_id, 5, None, 2).await.unwrap();
        tx.commit().await.unwrap();

        let stock = find_by_variant(&pool, variant_id).await.unwrap().unwrap();
        assert_eq!(stock.quantity, 5);
        assert_eq!(stock.location.as_deref(), Some("A-1"));
        assert_eq!(stock.updated_at, 2);
    }
}
