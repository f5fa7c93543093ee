//! Shopping cart
//!
//! Every user has at most one ACTIVE cart, created on first use. Item
//! quantities are checked against current stock but nothing is reserved
//! until checkout.

use shared::models::{Cart, CartItemRequest, CartStatus};
use shared::{AppError, ErrorCode};
use sqlx::SqlitePool;

use crate::auth::{Action, CurrentUser, Resource, require};
use crate::core::ServiceResult;
use crate::db::repository::{cart, variant};
use crate::utils::validation::validate_quantity;

async fn with_items(pool: &SqlitePool, mut active: Cart) -> ServiceResult<Cart> {
    active.items = cart::items(pool, active.id).await?;
    Ok(active)
}

async fn owned_active(pool: &SqlitePool, principal: &CurrentUser) -> ServiceResult<Cart> {
    let active = cart::get_or_create_active(pool, principal.id, shared::util::now_millis()).await?;
    require(
        principal,
        Action::Write,
        Resource::Cart {
            owner_id: active.user_id,
        },
        "You do not have access to this cart",
    )?;
    Ok(active)
}

/// The principal's active cart with its items
pub async fn get_active(pool: &SqlitePool, principal: &CurrentUser) -> ServiceResult<Cart> {
    let active = owned_active(pool, principal).await?;
    with_items(pool, active).await
}

/// Add a variant or overwrite its quantity
pub async fn set_item(
    pool: &SqlitePool,
    principal: &CurrentUser,
    request: &CartItemRequest,
) -> ServiceResult<Cart> {
    validate_quantity(request.quantity, ErrorCode::CartQuantityOutOfRange)?;

    let found = variant::find_by_id(pool, request.variant_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::VariantNotFound,
                format!("Variant {} not found", request.variant_id),
            )
        })?;
    let available = found.stock_quantity.unwrap_or(0);
    if request.quantity > available {
        return Err(AppError::insufficient_stock(&found.sku, available).into());
    }

    let active = owned_active(pool, principal).await?;
    let written = cart::upsert_item(
        pool,
        active.id,
        found.id,
        request.quantity,
        shared::util::now_millis(),
    )
    .await?;
    if !written {
        // Checked out between lookup and write
        return Err(AppError::new(ErrorCode::CartNotFound).into());
    }
    tracing::debug!(
        cart_id = active.id,
        variant_id = found.id,
        quantity = request.quantity,
        "Cart item set"
    );
    with_items(pool, active).await
}

pub async fn remove_item(
    pool: &SqlitePool,
    principal: &CurrentUser,
    variant_id: i64,
) -> ServiceResult<Cart> {
    let active = cart::find_active(pool, principal.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CartNotFound))?;
    if !cart::remove_item(pool, active.id, variant_id, shared::util::now_millis()).await? {
        return Err(AppError::new(ErrorCode::CartItemNotFound)
            .with_detail("variantId", variant_id)
            .into());
    }
    with_items(pool, active).await
}

/// Empty the active cart, creating it if needed
pub async fn clear(pool: &SqlitePool, principal: &CurrentUser) -> ServiceResult<Cart> {
    let active = owned_active(pool, principal).await?;
    if !cart::clear(pool, active.id, shared::util::now_millis()).await? {
        return Err(AppError::new(ErrorCode::CartNotFound).into());
    }
    with_items(pool, active).await
}

/// Close the active cart without creating an order
pub async fn close(pool: &SqlitePool, principal: &CurrentUser) -> ServiceResult<Cart> {
    let active = cart::find_active(pool, principal.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CartNotFound))?;

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    if !cart::mark_checked_out(&mut tx, active.id, now).await? {
        return Err(AppError::new(ErrorCode::CartNotFound).into());
    }
    tx.commit().await?;

    tracing::info!(cart_id = active.id, user_id = principal.id, "Cart closed without order");
    let closed = Cart {
        status: CartStatus::CheckedOut,
        updated_at: now,
        ..active
    };
    with_items(pool, closed).await
}
