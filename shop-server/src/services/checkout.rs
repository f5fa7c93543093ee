//! Cart checkout
//!
//! Converts the user's active cart into a `PAYMENT_PENDING` order with a
//! pending payment intent. Stock reservation, order, history, movements,
//! payment and the cart status flip commit together or not at all.

use serde_json::json;
use shared::models::{
    CheckoutRequest, CheckoutResponse, MovementReason, OrderStatus, PaymentStatus,
};
use shared::{AppError, ErrorCode};
use sqlx::SqlitePool;

use crate::core::ServiceResult;
use crate::db::repository::payment::NewPayment;
use crate::db::repository::{cart, order, payment};
use crate::pricing::{self, DEFAULT_SHIPPING_METHOD};
use crate::services::ledger;

pub const CURRENCY: &str = "USD";
pub const PAYMENT_PROVIDER: &str = "mock";

pub async fn checkout(
    pool: &SqlitePool,
    user_id: i64,
    request: &CheckoutRequest,
) -> ServiceResult<CheckoutResponse> {
    let active = cart::find_active(pool, user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CartNotFound))?;

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    // First write; line edits after this point see a CHECKED_OUT cart
    if !cart::mark_checked_out(&mut tx, active.id, now).await? {
        return Err(AppError::new(ErrorCode::CartNotFound).into());
    }
    let items = cart::items(&mut *tx, active.id).await?;
    if items.is_empty() {
        return Err(AppError::new(ErrorCode::CartEmpty).into());
    }

    let shipping_method = request.shipping_method.as_deref();
    let amount = pricing::calculate_breakdown(
        items.iter().map(|item| (item.price, item.quantity)),
        shipping_method,
    );
    let intent_id = format!("pi_{}", uuid::Uuid::new_v4());
    let metadata = json!({
        "shippingMethod": shipping_method.unwrap_or(DEFAULT_SHIPPING_METHOD),
        "note": request.note,
    });

    let mut changes = Vec::with_capacity(items.len());
    for item in &items {
        let change = ledger::reserve(&mut tx, item.variant_id, &item.sku, item.quantity, now).await?;
        changes.push(change);
    }

    let order_id = order::insert(&mut tx, user_id, OrderStatus::PaymentPending, amount.total, now).await?;
    for item in &items {
        order::insert_item(&mut tx, order_id, item.variant_id, item.quantity, item.price).await?;
    }
    order::insert_history(&mut tx, order_id, OrderStatus::PaymentPending, Some(user_id), now).await?;

    for (item, change) in items.iter().zip(changes) {
        ledger::record_movement(
            &mut tx,
            item.variant_id,
            Some(order_id),
            change,
            MovementReason::Checkout,
            now,
        )
        .await?;
    }

    let created = payment::insert(
        &mut tx,
        &NewPayment {
            order_id,
            amount: amount.total,
            currency: CURRENCY,
            provider: PAYMENT_PROVIDER,
            intent_id: &intent_id,
            metadata: &metadata,
        },
        now,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        user_id,
        order_id,
        cart_id = active.id,
        intent_id = %intent_id,
        total = amount.total,
        "Checkout completed"
    );

    Ok(CheckoutResponse {
        order_id,
        order_status: OrderStatus::PaymentPending,
        payment_intent_id: created.intent_id,
        payment_status: PaymentStatus::Pending,
        amount,
    })
}
