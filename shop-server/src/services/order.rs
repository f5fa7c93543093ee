//! Direct order creation and order queries
//!
//! Orders created here skip the cart and the payment step. Stock is still
//! reserved and every reservation is logged as `ORDER_CREATED`.

use std::collections::HashSet;

use shared::models::{CreateOrderRequest, MovementReason, Order, OrderQuery, OrderStatus};
use shared::{AppError, ErrorCode, PageQuery, PaginatedResponse};
use sqlx::SqlitePool;

use crate::auth::{Action, CurrentUser, Resource, require};
use crate::core::ServiceResult;
use crate::db::repository::{order, user, variant};
use crate::pricing;
use crate::services::ledger;
use crate::utils::validation::validate_quantity;

pub async fn create_order(
    pool: &SqlitePool,
    principal: &CurrentUser,
    request: &CreateOrderRequest,
) -> ServiceResult<Order> {
    if request.items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty).into());
    }
    let mut seen = HashSet::new();
    for item in &request.items {
        validate_quantity(item.quantity, ErrorCode::ValueOutOfRange)?;
        if !seen.insert(item.variant_id) {
            return Err(AppError::validation(format!(
                "Variant {} appears more than once",
                item.variant_id
            ))
            .into());
        }
    }

    let target_user = request.user_id.unwrap_or(principal.id);
    if target_user != principal.id {
        require(
            principal,
            Action::Write,
            Resource::AllOrders,
            "Users can only create orders for themselves",
        )?;
    }
    if !user::exists(pool, target_user).await? {
        return Err(AppError::with_message(
            ErrorCode::UserNotFound,
            format!("User {target_user} not found"),
        )
        .into());
    }

    let mut lines = Vec::with_capacity(request.items.len());
    for item in &request.items {
        let Some(found) = variant::find_by_id(pool, item.variant_id).await? else {
            return Err(AppError::with_message(
                ErrorCode::VariantNotFound,
                "One or more variants were not found",
            )
            .with_detail("variantId", item.variant_id)
            .into());
        };
        lines.push((found, item.quantity));
    }

    let status = if principal.is_staff() {
        request.status.unwrap_or(OrderStatus::Pending)
    } else {
        OrderStatus::Pending
    };
    let total = pricing::to_f64(pricing::line_subtotal(
        lines.iter().map(|(v, quantity)| (v.price, *quantity)),
    ));

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let mut changes = Vec::with_capacity(lines.len());
    for (v, quantity) in &lines {
        changes.push(ledger::reserve(&mut tx, v.id, &v.sku, *quantity, now).await?);
    }

    let order_id = order::insert(&mut tx, target_user, status, total, now).await?;
    for (v, quantity) in &lines {
        order::insert_item(&mut tx, order_id, v.id, *quantity, v.price).await?;
    }
    order::insert_history(&mut tx, order_id, status, Some(principal.id), now).await?;
    for ((v, _), change) in lines.iter().zip(changes) {
        ledger::record_movement(
            &mut tx,
            v.id,
            Some(order_id),
            change,
            MovementReason::OrderCreated,
            now,
        )
        .await?;
    }
    tx.commit().await?;

    tracing::info!(
        order_id,
        user_id = target_user,
        created_by = principal.id,
        status = status.as_str(),
        total,
        "Order created"
    );

    let created = order::find_by_id(pool, order_id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::OrderNotFound, format!("Order {order_id} not found"))
    })?;
    Ok(created)
}

/// Orders visible to the principal, newest first
///
/// USER principals only ever see their own orders; `userId` is ignored for them.
pub async fn list_orders(
    pool: &SqlitePool,
    principal: &CurrentUser,
    query: &OrderQuery,
) -> ServiceResult<PaginatedResponse<Order>> {
    let user_filter = if principal.is_staff() {
        query.user_id
    } else {
        Some(principal.id)
    };
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let (orders, total) = order::list(pool, query.status, user_filter, &page).await?;
    Ok(PaginatedResponse::new(orders, total, page.page(), page.limit()))
}

/// One order with items, history and payment
pub async fn get_order(pool: &SqlitePool, principal: &CurrentUser, id: i64) -> ServiceResult<Order> {
    let found = order::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
    })?;
    require(
        principal,
        Action::Read,
        Resource::Order {
            owner_id: found.user_id,
        },
        "You do not have access to this order",
    )?;
    Ok(found)
}
