//! Variant API Handlers

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::models::{Variant, VariantCreate, VariantQuery, VariantUpdate};
use shared::{AppError, ErrorCode, PageQuery, PaginatedResponse};

use crate::api::{ApiResult, duplicate_as, json_body, path, query};
use crate::auth::{Action, CurrentUser, Resource, require};
use crate::core::ServerState;
use crate::db::repository::variant;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_price, validate_price_range, validate_required_text,
};

const WRITE_DENIED: &str = "Only managers can change the catalog";

/// GET /api/v1/variants
pub async fn list(
    State(state): State<ServerState>,
    params: Result<Query<VariantQuery>, QueryRejection>,
) -> ApiResult<Json<PaginatedResponse<Variant>>> {
    let params = query(params)?;
    validate_price_range(params.min_price, params.max_price)?;

    let page = PageQuery {
        page: params.page,
        limit: params.limit,
    };
    let sku = params.sku.as_deref().filter(|s| !s.trim().is_empty());
    let (rows, total) = variant::list(
        &state.pool,
        sku,
        params.product_id,
        params.min_price,
        params.max_price,
        &page,
    )
    .await?;
    Ok(Json(PaginatedResponse::new(rows, total, page.page(), page.limit())))
}

/// GET /api/v1/variants/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Variant>> {
    let id = path(id)?;
    let found = variant::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::VariantNotFound, format!("Variant {id} not found"))
    })?;
    Ok(Json(found))
}

/// POST /api/v1/variants
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    payload: Result<Json<VariantCreate>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Variant>)> {
    require(&current_user, Action::Write, Resource::Catalog, WRITE_DENIED)?;
    let data = json_body(payload)?;
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&data.sku, "sku", MAX_SHORT_TEXT_LEN)?;
    validate_price(data.price, "price")?;

    let created = variant::create(&state.pool, &data, shared::util::now_millis())
        .await
        .map_err(duplicate_as(ErrorCode::VariantSkuExists))?;
    tracing::info!(variant_id = created.id, sku = %created.sku, "Variant created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/variants/{id}
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<VariantUpdate>, JsonRejection>,
) -> ApiResult<Json<Variant>> {
    require(&current_user, Action::Write, Resource::Catalog, WRITE_DENIED)?;
    let id = path(id)?;
    let data = json_body(payload)?;
    if let Some(name) = &data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(sku) = &data.sku {
        validate_required_text(sku, "sku", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(price) = data.price {
        validate_price(price, "price")?;
    }

    let updated = variant::update(&state.pool, id, &data, shared::util::now_millis())
        .await
        .map_err(duplicate_as(ErrorCode::VariantSkuExists))?;
    Ok(Json(updated))
}
