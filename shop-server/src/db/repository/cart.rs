//! Cart Repository

use shared::models::{Cart, CartItem};
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::{RepoError, RepoResult};

pub async fn find_active(pool: &SqlitePool, user_id: i64) -> RepoResult<Option<Cart>> {
    let cart = sqlx::query_as::<_, Cart>(
        "SELECT * FROM cart WHERE user_id = ? AND status = 'ACTIVE'",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(cart)
}

/// The user's active cart, created when there is none
pub async fn get_or_create_active(pool: &SqlitePool, user_id: i64, now: i64) -> RepoResult<Cart> {
    // The partial unique index turns a concurrent second insert into a no-op
    sqlx::query(
        "INSERT OR IGNORE INTO cart (user_id, status, created_at, updated_at)
         VALUES (?1, 'ACTIVE', ?2, ?2)",
    )
    .bind(user_id)
    .bind(now)
    .execute(pool)
    .await?;

    find_active(pool, user_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create active cart".to_string()))
}

/// Cart lines with variant, product and stock detail, in insertion order
pub async fn items(
    conn: impl sqlx::Executor<'_, Database = Sqlite>,
    cart_id: i64,
) -> RepoResult<Vec<CartItem>> {
    let items = sqlx::query_as::<_, CartItem>(
        "SELECT ci.id, ci.cart_id, ci.variant_id, ci.quantity,
                v.sku, v.name AS variant_name, p.name AS product_name, v.price,
                COALESCE(s.quantity, 0) AS available
         FROM cart_item ci
         JOIN variant v ON v.id = ci.variant_id
         JOIN product p ON p.id = v.product_id
         LEFT JOIN stock s ON s.variant_id = ci.variant_id
         WHERE ci.cart_id = ?
         ORDER BY ci.id",
    )
    .bind(cart_id)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

/// Insert the line or overwrite its quantity; `false` when the cart is no longer active
pub async fn upsert_item(
    pool: &SqlitePool,
    cart_id: i64,
    variant_id: i64,
    quantity: i64,
    now: i64,
) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        "INSERT INTO cart_item (cart_id, variant_id, quantity, created_at, updated_at)
         SELECT ?1, ?2, ?3, ?4, ?4
         WHERE EXISTS (SELECT 1 FROM cart WHERE id = ?1 AND status = 'ACTIVE')
         ON CONFLICT(cart_id, variant_id) DO UPDATE SET
             quantity = excluded.quantity,
             updated_at = excluded.updated_at",
    )
    .bind(cart_id)
    .bind(variant_id)
    .bind(quantity)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    if result.rows_affected() == 0 {
        return Ok(false);
    }
    touch(&mut tx, cart_id, now).await?;
    tx.commit().await?;
    Ok(true)
}

/// Remove one line; `false` when the variant was not in an active cart
pub async fn remove_item(
    pool: &SqlitePool,
    cart_id: i64,
    variant_id: i64,
    now: i64,
) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        "DELETE FROM cart_item WHERE cart_id = ?1 AND variant_id = ?2
         AND EXISTS (SELECT 1 FROM cart WHERE id = ?1 AND status = 'ACTIVE')",
    )
    .bind(cart_id)
    .bind(variant_id)
    .execute(&mut *tx)
    .await?;
    if result.rows_affected() == 0 {
        return Ok(false);
    }
    touch(&mut tx, cart_id, now).await?;
    tx.commit().await?;
    Ok(true)
}

/// Empty an active cart; `false` when it was checked out meanwhile
pub async fn clear(pool: &SqlitePool, cart_id: i64, now: i64) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        "UPDATE cart SET updated_at = ? WHERE id = ? AND status = 'ACTIVE'",
    )
    .bind(now)
    .bind(cart_id)
    .execute(&mut *tx)
    .await?;
    if result.rows_affected() == 0 {
        return Ok(false);
    }
    sqlx::query("DELETE FROM cart_item WHERE cart_id = ?")
        .bind(cart_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(true)
}

/// Flip an ACTIVE cart to CHECKED_OUT; `false` if it was no longer active
pub async fn mark_checked_out(
    tx: &mut Transaction<'_, Sqlite>,
    cart_id: i64,
    now: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE cart SET status = 'CHECKED_OUT', updated_at = ?
         WHERE id = ? AND status = 'ACTIVE'",
    )
    .bind(now)
    .bind(cart_id)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() == 1)
}

async fn touch(tx: &mut Transaction<'_, Sqlite>, cart_id: i64, now: i64) -> RepoResult<()> {
    sqlx::query("UPDATE cart SET updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(cart_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{memory_pool, seed_user, seed_variant};
    use shared::models::CartStatus;

    #[tokio::test]
    async fn test_get_or_create_is_stable() {
        let pool = memory_pool().await;
        let user_id = seed_user(&pool, "ann@example.com", "USER").await;

        let first = get_or_create_active(&pool, user_id, 1).await.unwrap();
        let second = get_or_create_active(&pool, user_id, 2).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.status, CartStatus::Active);
        assert_eq!(second.created_at, 1);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_quantity() {
        let pool = memory_pool().await;
        let user_id = seed_user(&pool, "ann@example.com", "USER").await;
        let variant_id = seed_variant(&pool, "SOCK", 4.5, 10).await;
        let cart = get_or_create_active(&pool, user_id, 0).await.unwrap();

        assert!(upsert_item(&pool, cart.id, variant_id, 2, 1).await.unwrap());
        assert!(upsert_item(&pool, cart.id, variant_id, 5, 2).await.unwrap());

        let lines = items(&pool, cart.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 5);
        assert_eq!(lines[0].sku, "SOCK");
        assert_eq!(lines[0].price, 4.5);
        assert_eq!(lines[0].available, 10);

        assert!(remove_item(&pool, cart.id, variant_id, 3).await.unwrap());
        assert!(!remove_item(&pool, cart.id, variant_id, 3).await.unwrap());
    }

    #[tokio::test]
    async fn test_checked_out_cart_is_replaced() {
        let pool = memory_pool().await;
        let user_id = seed_user(&pool, "ann@example.com", "USER").await;
        let cart = get_or_create_active(&pool, user_id, 0).await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        assert!(mark_checked_out(&mut tx, cart.id, 1).await.unwrap());
        assert!(!mark_checked_out(&mut tx, cart.id, 1).await.unwrap());
        tx.commit().await.unwrap();

        assert!(find_active(&pool, user_id).await.unwrap().is_none());
        let next = get_or_create_active(&pool, user_id, 2).await.unwrap();
        assert_ne!(next.id, cart.id);
    }

    #[tokio::test]
    async fn test_checked_out_cart_rejects_line_changes() {
        let pool = memory_pool().await;
        let user_id = seed_user(&pool, "ann@example.com", "USER").await;
        let variant_id = seed_variant(&pool, "SOCK", 4.5, 10).await;
        let cart = get_or_create_active(&pool, user_id, 0).await.unwrap();
        assert!(upsert_item(&pool, cart.id, variant_id, 1, 1).await.unwrap());

        let mut tx = pool.begin().await.unwrap();
        assert!(mark_checked_out(&mut tx, cart.id, 2).await.unwrap());
        tx.commit().await.unwrap();

        assert!(!upsert_item(&pool, cart.id, variant_id, 3, 3).await.unwrap());
        assert!(!remove_item(&pool, cart.id, variant_id, 3).await.unwrap());
        assert!(!clear(&pool, cart.id, 3).await.unwrap());

        let lines = items(&pool, cart.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 1);
    }
}
