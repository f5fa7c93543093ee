//! Payment reconciliation
//!
//! Applies provider webhooks. Replays are safe: the payment row is
//! overwritten with the same status and the order only moves (with one
//! history row) when its target status differs.

use shared::models::{Payment, WebhookPayload};
use shared::{AppError, ErrorCode};
use sqlx::SqlitePool;

use crate::core::ServiceResult;
use crate::db::repository::{order, payment};
use crate::services::order_status;

pub async fn handle_webhook(pool: &SqlitePool, payload: &WebhookPayload) -> ServiceResult<Payment> {
    let Some(existing) = payment::find_by_intent(pool, &payload.intent_id).await? else {
        tracing::warn!(intent_id = %payload.intent_id, "Webhook for unknown payment intent");
        return Err(AppError::with_message(
            ErrorCode::PaymentIntentNotFound,
            format!("Payment intent {} not found", payload.intent_id),
        )
        .into());
    };

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    let updated = payment::update_status(&mut tx, existing.id, payload.status, now).await?;

    let current = order::status(&mut tx, existing.order_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::OrderNotFound,
                format!("Order {} not found", existing.order_id),
            )
        })?;
    let target = order_status::next_status(current, payload.status);
    let changed =
        order_status::transition(&mut tx, existing.order_id, current, target, None, now).await?;
    tx.commit().await?;

    tracing::info!(
        intent_id = %payload.intent_id,
        payment_status = ?payload.status,
        order_id = existing.order_id,
        order_changed = changed,
        "Payment webhook applied"
    );
    Ok(updated)
}
