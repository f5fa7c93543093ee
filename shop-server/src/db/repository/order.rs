//! Order Repository

use shared::PageQuery;
use shared::models::{Order, OrderItem, OrderStatus, OrderStatusHistory};
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::{RepoResult, payment, to_total};

/// Order with items, status history and payment
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let Some(mut order) = order else {
        return Ok(None);
    };
    order.items = items(pool, id).await?;
    order.history = history(pool, id).await?;
    order.payment = payment::find_by_order(pool, id).await?;
    Ok(Some(order))
}

/// Orders newest first, with their items
pub async fn list(
    pool: &SqlitePool,
    status: Option<OrderStatus>,
    user_id: Option<i64>,
    page: &PageQuery,
) -> RepoResult<(Vec<Order>, u64)> {
    const FILTER: &str = "WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR user_id = ?2)";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM orders {FILTER}"))
        .bind(status)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    let mut orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT * FROM orders {FILTER} ORDER BY created_at DESC, id DESC LIMIT ?3 OFFSET ?4"
    ))
    .bind(status)
    .bind(user_id)
    .bind(i64::from(page.limit()))
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    for order in &mut orders {
        order.items = items(pool, order.id).await?;
    }
    Ok((orders, to_total(total)))
}

pub async fn items(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT oi.id, oi.order_id, oi.variant_id, oi.quantity, oi.price,
                v.sku, v.name AS variant_name
         FROM order_item oi JOIN variant v ON v.id = oi.variant_id
         WHERE oi.order_id = ? ORDER BY oi.id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

/// Status history, oldest first
pub async fn history(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderStatusHistory>> {
    let history = sqlx::query_as::<_, OrderStatusHistory>(
        "SELECT * FROM order_status_history WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(history)
}

pub async fn insert(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: i64,
    status: OrderStatus,
    total: f64,
    now: i64,
) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO orders (user_id, status, total, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4) RETURNING id",
    )
    .bind(user_id)
    .bind(status)
    .bind(total)
    .bind(now)
    .fetch_one(&mut **tx)
    .await?;
    Ok(id)
}

pub async fn insert_item(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: i64,
    variant_id: i64,
    quantity: i64,
    price: f64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO order_item (order_id, variant_id, quantity, price) VALUES (?, ?, ?, ?)",
    )
    .bind(order_id)
    .bind(variant_id)
    .bind(quantity)
    .bind(price)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn insert_history(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: i64,
    status: OrderStatus,
    changed_by: Option<i64>,
    now: i64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO order_status_history (order_id, status, changed_by, created_at)
         VALUES (?, ?, ?, ?)",
    )
    .bind(order_id)
    .bind(status)
    .bind(changed_by)
    .bind(now)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn status(tx: &mut Transaction<'_, Sqlite>, order_id: i64) -> RepoResult<Option<OrderStatus>> {
    let status: Option<OrderStatus> = sqlx::query_scalar("SELECT status FROM orders WHERE id = ?")
        .bind(order_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(status)
}

pub async fn update_status(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: i64,
    status: OrderStatus,
    now: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(order_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{memory_pool, seed_user, seed_variant};

    async fn seed_order(pool: &SqlitePool, user_id: i64, variant_id: i64, now: i64) -> i64 {
        let mut tx = pool.begin().await.unwrap();
        let id = insert(&mut tx, user_id, OrderStatus::Pending, 20.0, now).await.unwrap();
        insert_item(&mut tx, id, variant_id, 2, 10.0).await.unwrap();
        insert_history(&mut tx, id, OrderStatus::Pending, Some(user_id), now)
            .await
            .unwrap();
        tx.commit().await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_find_with_relations() {
        let pool = memory_pool().await;
        let user_id = seed_user(&pool, "ann@example.com", "USER").await;
        let variant_id = seed_variant(&pool, "BOOK", 10.0, 5).await;
        let id = seed_order(&pool, user_id, variant_id, 1).await;

        let order = find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].sku, "BOOK");
        assert_eq!(order.history.len(), 1);
        assert_eq!(order.history[0].changed_by, Some(user_id));
        assert!(order.payment.is_none());
        assert!(find_by_id(&pool, id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_newest_first() {
        let pool = memory_pool().await;
        let ann = seed_user(&pool, "ann@example.com", "USER").await;
        let bob = seed_user(&pool, "bob@example.com", "USER").await;
        let variant_id = seed_variant(&pool, "BOOK", 10.0, 5).await;
        let first = seed_order(&pool, ann, variant_id, 1).await;
        let second = seed_order(&pool, ann, variant_id, 2).await;
        seed_order(&pool, bob, variant_id, 3).await;

        let mut tx = pool.begin().await.unwrap();
        update_status(&mut tx, first, OrderStatus::Paid, 4).await.unwrap();
        assert_eq!(status(&mut tx, first).await.unwrap(), Some(OrderStatus::Paid));
        tx.commit().await.unwrap();

        let page = PageQuery::default();
        let (all, total) = list(&pool, None, None, &page).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(all[0].user_id, bob);

        let (anns, total) = list(&pool, None, Some(ann), &page).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(anns[0].id, second);
        assert_eq!(anns[0].items.len(), 1);

        let (paid, total) = list(&pool, Some(OrderStatus::Paid), None, &page).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(paid[0].id, first);
    }
}
