//! Order API Handlers

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::PaginatedResponse;
use shared::models::{CreateOrderRequest, Order, OrderQuery};

use crate::api::{ApiResult, json_body, path, query};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::order as order_service;

/// POST /api/v1/orders
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let request = json_body(payload)?;
    let created = order_service::create_order(&state.pool, &current_user, &request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/orders
pub async fn list(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    params: Result<Query<OrderQuery>, QueryRejection>,
) -> ApiResult<Json<PaginatedResponse<Order>>> {
    let params = query(params)?;
    Ok(Json(order_service::list_orders(&state.pool, &current_user, &params).await?))
}

/// GET /api/v1/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Order>> {
    let id = path(id)?;
    Ok(Json(order_service::get_order(&state.pool, &current_user, id).await?))
}
