//! Stock ledger
//!
//! Stock only changes through this module and every change writes a
//! movement row in the same transaction.

use shared::models::{MovementReason, Stock};
use shared::{AppError, ErrorCode};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::core::ServiceResult;
use crate::db::repository::{stock, variant};

/// Quantity before and after a change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    pub previous_quantity: i64,
    pub new_quantity: i64,
}

impl StockChange {
    /// Signed delta
    pub fn change(&self) -> i64 {
        self.new_quantity - self.previous_quantity
    }
}

/// Take `quantity` units of a variant inside the caller's transaction
///
/// A single conditional UPDATE; fails with `InsufficientStock` (naming
/// `sku` and the available quantity) when less is on hand. A variant without
/// a stock row has 0 available.
pub async fn reserve(
    tx: &mut Transaction<'_, Sqlite>,
    variant_id: i64,
    sku: &str,
    quantity: i64,
    now: i64,
) -> ServiceResult<StockChange> {
    match stock::decrement_if_available(tx, variant_id, quantity, now).await? {
        Some(new_quantity) => Ok(StockChange {
            previous_quantity: new_quantity + quantity,
            new_quantity,
        }),
        None => {
            let available = stock::quantity(tx, variant_id).await?;
            tracing::info!(variant_id, sku, requested = quantity, available, "Insufficient stock");
            Err(AppError::insufficient_stock(sku, available).into())
        }
    }
}

/// Append an immutable movement row
pub async fn record_movement(
    tx: &mut Transaction<'_, Sqlite>,
    variant_id: i64,
    order_id: Option<i64>,
    change: StockChange,
    reason: MovementReason,
    now: i64,
) -> ServiceResult<()> {
    stock::insert_movement(
        tx,
        variant_id,
        order_id,
        change.change(),
        change.previous_quantity,
        change.new_quantity,
        reason,
        now,
    )
    .await?;
    Ok(())
}

/// Administrative overwrite of a variant's stock, logged as `MANUAL_ADJUST`
///
/// Creates the stock row when missing (previous quantity 0). A `None`
/// location keeps the stored one.
pub async fn adjust(
    pool: &SqlitePool,
    variant_id: i64,
    quantity: i64,
    location: Option<&str>,
) -> ServiceResult<Stock> {
    if quantity < 0 {
        return Err(AppError::with_message(
            ErrorCode::InvalidStockQuantity,
            "Stock quantity must be non-negative",
        )
        .into());
    }
    if variant::find_by_id(pool, variant_id).await?.is_none() {
        return Err(AppError::with_message(
            ErrorCode::VariantNotFound,
            format!("Variant {variant_id} not found"),
        )
        .into());
    }

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    let previous_quantity = stock::touch(&mut tx, variant_id, now).await?.unwrap_or(0);
    stock::set_quantity(&mut tx, variant_id, quantity, location, now).await?;
    let change = StockChange {
        previous_quantity,
        new_quantity: quantity,
    };
    record_movement(&mut tx, variant_id, None, change, MovementReason::ManualAdjust, now).await?;
    tx.commit().await?;

    tracing::info!(
        variant_id,
        previous = previous_quantity,
        new = quantity,
        "Stock adjusted"
    );

    stock::find_by_variant(pool, variant_id).await?.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::StockNotFound,
            format!("Stock for variant {variant_id} not found"),
        )
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{count, memory_pool, seed_variant, stock_of};
    use shared::models::StockMovement;

    async fn movements(pool: &SqlitePool, variant_id: i64) -> Vec<StockMovement> {
        sqlx::query_as("SELECT * FROM stock_movement WHERE variant_id = ? ORDER BY id")
            .bind(variant_id)
            .fetch_all(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_reserve_reports_previous_and_new() {
        let pool = memory_pool().await;
        let variant_id = seed_variant(&pool, "LAMP", 40.0, 5).await;

        let mut tx = pool.begin().await.unwrap();
        let change = reserve(&mut tx, variant_id, "LAMP", 3, 1).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(
            change,
            StockChange {
                previous_quantity: 5,
                new_quantity: 2
            }
        );
        assert_eq!(change.change(), -3);
        assert_eq!(stock_of(&pool, variant_id).await, 2);
    }

    #[tokio::test]
    async fn test_reserve_insufficient() {
        let pool = memory_pool().await;
        let variant_id = seed_variant(&pool, "LAMP", 40.0, 2).await;

        let mut tx = pool.begin().await.unwrap();
        let err = reserve(&mut tx, variant_id, "LAMP", 3, 1).await.unwrap_err();
        drop(tx);

        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::InsufficientStock);
        assert_eq!(app.message, "Insufficient stock for variant LAMP. Available: 2");
        assert_eq!(stock_of(&pool, variant_id).await, 2);
    }

    #[tokio::test]
    async fn test_adjust_logs_manual_movement() {
        let pool = memory_pool().await;
        let variant_id = seed_variant(&pool, "LAMP", 40.0, 2).await;

        let stock = adjust(&pool, variant_id, 9, Some("B-3")).await.unwrap();
        assert_eq!(stock.quantity, 9);
        assert_eq!(stock.location.as_deref(), Some("B-3"));

        let rows = movements(&pool, variant_id).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].reason, MovementReason::ManualAdjust);
        assert_eq!(rows[0].previous_quantity, 2);
        assert_eq!(rows[0].new_quantity, 9);
        assert_eq!(rows[0].change, 7);
        assert_eq!(rows[0].order_id, None);
    }

    #[tokio::test]
    async fn test_adjust_creates_missing_row() {
        let pool = memory_pool().await;
        let variant_id = seed_variant(&pool, "LAMP", 40.0, 0).await;
        sqlx::query("DELETE FROM stock").execute(&pool).await.unwrap();

        let stock = adjust(&pool, variant_id, 4, None).await.unwrap();
        assert_eq!(stock.quantity, 4);
        let rows = movements(&pool, variant_id).await;
        assert_eq!(rows[0].previous_quantity, 0);
    }

    #[tokio::test]
    async fn test_adjust_rejects_bad_input() {
        let pool = memory_pool().await;
        let variant_id = seed_variant(&pool, "LAMP", 40.0, 1).await;

        let err: AppError = adjust(&pool, variant_id, -1, None).await.unwrap_err().into();
        assert_eq!(err.code, ErrorCode::InvalidStockQuantity);

        let err: AppError = adjust(&pool, variant_id + 5, 1, None).await.unwrap_err().into();
        assert_eq!(err.code, ErrorCode::VariantNotFound);
        assert_eq!(count(&pool, "stock_movement").await, 0);
    }
}
