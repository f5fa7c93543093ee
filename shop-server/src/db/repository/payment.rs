//! Payment Repository

use shared::models::{Payment, PaymentStatus};
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::{RepoError, RepoResult};

pub async fn find_by_intent(pool: &SqlitePool, intent_id: &str) -> RepoResult<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payment WHERE intent_id = ?")
        .bind(intent_id)
        .fetch_optional(pool)
        .await?;
    Ok(payment)
}

pub async fn find_by_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payment WHERE order_id = ?")
        .bind(order_id)
        .fetch_optional(pool)
        .await?;
    Ok(payment)
}

/// New payment for an order
pub struct NewPayment<'a> {
    pub order_id: i64,
    pub amount: f64,
    pub currency: &'a str,
    pub provider: &'a str,
    pub intent_id: &'a str,
    pub metadata: &'a serde_json::Value,
}

pub async fn insert(
    tx: &mut Transaction<'_, Sqlite>,
    payment: &NewPayment<'_>,
    now: i64,
) -> RepoResult<Payment> {
    let created = sqlx::query_as::<_, Payment>(
        "INSERT INTO payment
             (order_id, amount, currency, provider, intent_id, status, metadata, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8) RETURNING *",
    )
    .bind(payment.order_id)
    .bind(payment.amount)
    .bind(payment.currency)
    .bind(payment.provider)
    .bind(payment.intent_id)
    .bind(PaymentStatus::Pending)
    .bind(sqlx::types::Json(payment.metadata))
    .bind(now)
    .fetch_one(&mut **tx)
    .await?;
    Ok(created)
}

/// Set the status and return the updated row
pub async fn update_status(
    tx: &mut Transaction<'_, Sqlite>,
    id: i64,
    status: PaymentStatus,
    now: i64,
) -> RepoResult<Payment> {
    let updated = sqlx::query_as::<_, Payment>(
        "UPDATE payment SET status = ?, updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(status)
    .bind(now)
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;
    updated.ok_or_else(|| RepoError::NotFound(format!("Payment {id} not found")))
}
