//! Sales Statistics Repository
//!
//! Sales figures are merchandise revenue: Σ(order item price × quantity),
//! rounded to cents in SQL.

use shared::models::{
    CategoryProductCount, CategorySales, Conversion, OrderStatus, OverviewTotals, PeriodSales,
    RecentOrder, SalesInterval, SkuSales, StatusRevenue, UserSummary,
};
use sqlx::SqlitePool;

use super::RepoResult;

/// Order filters shared by every report (timestamps in Unix millis)
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsFilter {
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub category_id: Option<i64>,
    pub status: Option<OrderStatus>,
}

/// Matches orders `o` and, through `p`, the category of each line
const ORDER_FILTER: &str = "(?1 IS NULL OR o.created_at >= ?1)
      AND (?2 IS NULL OR o.created_at <= ?2)
      AND (?3 IS NULL OR p.category_id = ?3)
      AND (?4 IS NULL OR o.status = ?4)";

const SALES_FROM: &str = "FROM orders o
     JOIN order_item oi ON oi.order_id = o.id
     JOIN variant v ON v.id = oi.variant_id
     JOIN product p ON p.id = v.product_id";

/// Number of rows in the admin dashboard lists
const OVERVIEW_LIST_LEN: i64 = 5;

pub async fn totals(pool: &SqlitePool, filter: &StatsFilter) -> RepoResult<OverviewTotals> {
    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user")
        .fetch_one(pool)
        .await?;

    let (orders, pending_orders): (i64, i64) = sqlx::query_as(&format!(
        "SELECT COUNT(DISTINCT o.id),
                COUNT(DISTINCT CASE WHEN o.status IN ('PENDING', 'PAYMENT_PENDING') THEN o.id END)
         {SALES_FROM} WHERE {ORDER_FILTER}"
    ))
    .bind(filter.start)
    .bind(filter.end)
    .bind(filter.category_id)
    .bind(filter.status)
    .fetch_one(pool)
    .await?;

    let revenue: f64 = sqlx::query_scalar(&format!(
        "SELECT ROUND(COALESCE(SUM(oi.price * oi.quantity), 0), 2) {SALES_FROM} WHERE {ORDER_FILTER}"
    ))
    .bind(filter.start)
    .bind(filter.end)
    .bind(filter.category_id)
    .bind(filter.status)
    .fetch_one(pool)
    .await?;

    Ok(OverviewTotals {
        users,
        orders,
        revenue,
        pending_orders,
    })
}

pub async fn revenue_by_status(
    pool: &SqlitePool,
    filter: &StatsFilter,
) -> RepoResult<Vec<StatusRevenue>> {
    let rows = sqlx::query_as::<_, StatusRevenue>(&format!(
        "SELECT o.status, ROUND(SUM(oi.price * oi.quantity), 2) AS revenue
         {SALES_FROM} WHERE {ORDER_FILTER}
         GROUP BY o.status ORDER BY o.status"
    ))
    .bind(filter.start)
    .bind(filter.end)
    .bind(filter.category_id)
    .bind(filter.status)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Categories with the most products
pub async fn top_categories(pool: &SqlitePool) -> RepoResult<Vec<CategoryProductCount>> {
    let rows = sqlx::query_as::<_, CategoryProductCount>(
        "SELECT c.id, c.name, COUNT(p.id) AS product_count
         FROM category c LEFT JOIN product p ON p.category_id = c.id
         GROUP BY c.id, c.name
         ORDER BY product_count DESC, c.name ASC
         LIMIT ?",
    )
    .bind(OVERVIEW_LIST_LEN)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[derive(sqlx::FromRow)]
struct RecentOrderRow {
    id: i64,
    status: OrderStatus,
    total: f64,
    created_at: i64,
    user_id: i64,
    email: String,
    name: String,
}

/// Latest orders in range with their customer
pub async fn recent_orders(pool: &SqlitePool, filter: &StatsFilter) -> RepoResult<Vec<RecentOrder>> {
    let rows = sqlx::query_as::<_, RecentOrderRow>(
        "SELECT o.id, o.status, o.total, o.created_at, u.id AS user_id, u.email, u.name
         FROM orders o JOIN user u ON u.id = o.user_id
         WHERE (?1 IS NULL OR o.created_at >= ?1)
           AND (?2 IS NULL OR o.created_at <= ?2)
           AND (?3 IS NULL OR o.status = ?3)
         ORDER BY o.created_at DESC, o.id DESC
         LIMIT ?4",
    )
    .bind(filter.start)
    .bind(filter.end)
    .bind(filter.status)
    .bind(OVERVIEW_LIST_LEN)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| RecentOrder {
            id: row.id,
            status: row.status,
            total: row.total,
            created_at: row.created_at,
            user: UserSummary {
                id: row.user_id,
                email: row.email,
                name: row.name,
            },
        })
        .collect())
}

/// Revenue per UTC day or month, oldest period first
pub async fn sales_by_period(
    pool: &SqlitePool,
    filter: &StatsFilter,
    interval: SalesInterval,
) -> RepoResult<Vec<PeriodSales>> {
    let format = match interval {
        SalesInterval::Day => "%Y-%m-%d",
        SalesInterval::Month => "%Y-%m",
    };
    let rows = sqlx::query_as::<_, PeriodSales>(&format!(
        "SELECT strftime(?5, o.created_at / 1000, 'unixepoch') AS period,
                ROUND(SUM(oi.price * oi.quantity), 2) AS revenue
         {SALES_FROM} WHERE {ORDER_FILTER}
         GROUP BY period ORDER BY period"
    ))
    .bind(filter.start)
    .bind(filter.end)
    .bind(filter.category_id)
    .bind(filter.status)
    .bind(format)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Units and revenue per category, highest revenue first
pub async fn sales_by_category(
    pool: &SqlitePool,
    filter: &StatsFilter,
) -> RepoResult<Vec<CategorySales>> {
    let rows = sqlx::query_as::<_, CategorySales>(&format!(
        "SELECT c.id AS category_id, c.name AS category_name,
                SUM(oi.quantity) AS quantity,
                ROUND(SUM(oi.price * oi.quantity), 2) AS revenue
         {SALES_FROM} JOIN category c ON c.id = p.category_id
         WHERE {ORDER_FILTER}
         GROUP BY c.id, c.name
         ORDER BY revenue DESC, c.id ASC"
    ))
    .bind(filter.start)
    .bind(filter.end)
    .bind(filter.category_id)
    .bind(filter.status)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Best-selling variants by units sold
pub async fn top_skus(
    pool: &SqlitePool,
    filter: &StatsFilter,
    limit: u32,
) -> RepoResult<Vec<SkuSales>> {
    let rows = sqlx::query_as::<_, SkuSales>(&format!(
        "SELECT v.id AS variant_id, v.sku, v.name, p.name AS product_name,
                SUM(oi.quantity) AS quantity_sold,
                ROUND(SUM(oi.price * oi.quantity), 2) AS revenue
         {SALES_FROM} WHERE {ORDER_FILTER}
         GROUP BY v.id, v.sku, v.name, p.name
         ORDER BY quantity_sold DESC, revenue DESC, v.id ASC
         LIMIT ?5"
    ))
    .bind(filter.start)
    .bind(filter.end)
    .bind(filter.category_id)
    .bind(filter.status)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Carts created in range and how many of them were checked out
pub async fn conversion(pool: &SqlitePool, filter: &StatsFilter) -> RepoResult<Conversion> {
    let (carts, orders): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(CASE WHEN status = 'CHECKED_OUT' THEN 1 ELSE 0 END), 0)
         FROM cart
         WHERE (?1 IS NULL OR created_at >= ?1) AND (?2 IS NULL OR created_at <= ?2)",
    )
    .bind(filter.start)
    .bind(filter.end)
    .fetch_one(pool)
    .await?;

    let conversion_rate = if carts == 0 {
        0.0
    } else {
        (orders as f64 / carts as f64 * 10_000.0).round() / 10_000.0
    };
    Ok(Conversion {
        carts,
        orders,
        conversion_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{memory_pool, seed_user, seed_variant};

    const DAY_MS: i64 = 86_400_000;

    async fn seed_order(
        pool: &SqlitePool,
        user_id: i64,
        variant_id: i64,
        quantity: i64,
        price: f64,
        status: &str,
        created_at: i64,
    ) {
        let order_id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (user_id, status, total, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4) RETURNING id",
        )
        .bind(user_id)
        .bind(status)
        .bind(price * quantity as f64)
        .bind(created_at)
        .fetch_one(pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO order_item (order_id, variant_id, quantity, price) VALUES (?, ?, ?, ?)")
            .bind(order_id)
            .bind(variant_id)
            .bind(quantity)
            .bind(price)
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reports() {
        let pool = memory_pool().await;
        let user_id = seed_user(&pool, "ann@example.com", "USER").await;
        let pen = seed_variant(&pool, "PEN", 1.5, 100).await;
        let ink = seed_variant(&pool, "INK", 4.0, 100).await;

        seed_order(&pool, user_id, pen, 4, 1.5, "PAID", 0).await;
        seed_order(&pool, user_id, ink, 1, 4.0, "PAYMENT_PENDING", DAY_MS).await;
        seed_order(&pool, user_id, pen, 2, 1.5, "PAID", DAY_MS + 1).await;

        let all = StatsFilter::default();
        let totals = totals(&pool, &all).await.unwrap();
        assert_eq!(totals.users, 1);
        assert_eq!(totals.orders, 3);
        assert_eq!(totals.pending_orders, 1);
        assert_eq!(totals.revenue, 13.0);

        let by_status = revenue_by_status(&pool, &all).await.unwrap();
        assert_eq!(by_status.len(), 2);
        assert_eq!(by_status[0].status, OrderStatus::Paid);
        assert_eq!(by_status[0].revenue, 9.0);

        let days = sales_by_period(&pool, &all, SalesInterval::Day).await.unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].period, "1970-01-01");
        assert_eq!(days[1].revenue, 7.0);

        let months = sales_by_period(&pool, &all, SalesInterval::Month).await.unwrap();
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].period, "1970-01");

        let top = top_skus(&pool, &all, 10).await.unwrap();
        assert_eq!(top[0].sku, "PEN");
        assert_eq!(top[0].quantity_sold, 6);

        let paid_only = StatsFilter {
            status: Some(OrderStatus::Paid),
            start: Some(DAY_MS),
            ..Default::default()
        };
        let categories = sales_by_category(&pool, &paid_only).await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].quantity, 2);
        assert_eq!(categories[0].revenue, 3.0);

        let recent = recent_orders(&pool, &all).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].user.email, "ann@example.com");
    }

    #[tokio::test]
    async fn test_conversion() {
        let pool = memory_pool().await;
        let empty = conversion(&pool, &StatsFilter::default()).await.unwrap();
        assert_eq!(empty.conversion_rate, 0.0);

        for (i, status) in ["CHECKED_OUT", "ACTIVE", "ACTIVE"].iter().enumerate() {
            let user_id = seed_user(&pool, &format!("u{i}@example.com"), "USER").await;
            sqlx::query("INSERT INTO cart (user_id, status, created_at, updated_at) VALUES (?, ?, 0, 0)")
                .bind(user_id)
                .bind(*status)
                .execute(&pool)
                .await
                .unwrap();
        }

        let result = conversion(&pool, &StatsFilter::default()).await.unwrap();
        assert_eq!(result.carts, 3);
        assert_eq!(result.orders, 1);
        assert_eq!(result.conversion_rate, 0.3333);
    }
}
