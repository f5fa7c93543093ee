//! Cart API Handlers

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Cart, CartItemRequest};

use crate::api::{ApiResult, json_body, path};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::cart as cart_service;

/// GET /api/v1/carts/active
pub async fn active(State(state): State<ServerState>, current_user: CurrentUser) -> ApiResult<Json<Cart>> {
    Ok(Json(cart_service::get_active(&state.pool, &current_user).await?))
}

/// POST|PUT /api/v1/carts/items
pub async fn set_item(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    payload: Result<Json<CartItemRequest>, JsonRejection>,
) -> ApiResult<Json<Cart>> {
    let request = json_body(payload)?;
    Ok(Json(cart_service::set_item(&state.pool, &current_user, &request).await?))
}

/// DELETE /api/v1/carts/items/{variantId}
pub async fn remove_item(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    variant_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Cart>> {
    let variant_id = path(variant_id)?;
    Ok(Json(cart_service::remove_item(&state.pool, &current_user, variant_id).await?))
}

/// DELETE /api/v1/carts/items
pub async fn clear(State(state): State<ServerState>, current_user: CurrentUser) -> ApiResult<Json<Cart>> {
    Ok(Json(cart_service::clear(&state.pool, &current_user).await?))
}

/// POST /api/v1/carts/checkout
pub async fn close(State(state): State<ServerState>, current_user: CurrentUser) -> ApiResult<Json<Cart>> {
    Ok(Json(cart_service::close(&state.pool, &current_user).await?))
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use serde_json::json;

    use crate::api::test_support::{app, login_as, send};
    use crate::db::test_support::seed_variant;

    #[tokio::test]
    async fn test_cart_flow() {
        let (app, state) = app().await;
        let (_, token) = login_as(&state, "ann@example.com", "USER").await;
        let variant_id = seed_variant(&state.pool, "SOCK", 4.5, 3).await;

        let (status, cart) = send(&app, Method::GET, "/api/v1/carts/active", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cart["status"], "ACTIVE");

        let (status, cart) = send(
            &app,
            Method::PUT,
            "/api/v1/carts/items",
            Some(&token),
            Some(json!({"variantId": variant_id, "quantity": 3})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cart["items"][0]["quantity"], 3);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/carts/items",
            Some(&token),
            Some(json!({"variantId": variant_id, "quantity": 4})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Insufficient stock for variant SOCK. Available: 3");

        let uri = format!("/api/v1/carts/items/{variant_id}");
        let (status, cart) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cart["items"].as_array().unwrap().len(), 0);
        let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, cart) = send(&app, Method::POST, "/api/v1/carts/checkout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cart["status"], "CHECKED_OUT");
    }
}
