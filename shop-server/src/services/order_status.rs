//! Order status state machine
//!
//! ```text
//! PENDING (direct orders)
//! PAYMENT_PENDING ──SUCCEEDED──▶ PAID
//!        │
//!        └──FAILED / CANCELED──▶ PAYMENT_FAILED
//! ```
//!
//! `PAID` and `PAYMENT_FAILED` are terminal. A payment still `PENDING`
//! leaves the order where it is.

use shared::models::{OrderStatus, PaymentStatus};
use sqlx::{Sqlite, Transaction};

use crate::core::ServiceResult;
use crate::db::repository::order;

/// Order status after a payment outcome
pub fn next_status(current: OrderStatus, payment: PaymentStatus) -> OrderStatus {
    if current.is_terminal() {
        return current;
    }
    match payment {
        PaymentStatus::Succeeded => OrderStatus::Paid,
        PaymentStatus::Failed | PaymentStatus::Canceled => OrderStatus::PaymentFailed,
        PaymentStatus::Pending => current,
    }
}

/// Move an order to `target`, appending one history row
///
/// Returns `false` (and writes nothing) when the order is already there.
pub async fn transition(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: i64,
    current: OrderStatus,
    target: OrderStatus,
    changed_by: Option<i64>,
    now: i64,
) -> ServiceResult<bool> {
    if current == target {
        return Ok(false);
    }
    order::update_status(tx, order_id, target, now).await?;
    order::insert_history(tx, order_id, target, changed_by, now).await?;
    tracing::info!(
        order_id,
        from = current.as_str(),
        to = target.as_str(),
        "Order status changed"
    );
    Ok(true)
}
