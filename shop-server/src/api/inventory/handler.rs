//! Inventory API Handlers

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{AdjustStockRequest, InventoryQuery, MovementQuery, Stock, StockMovement};
use shared::{AppError, ErrorCode, PageQuery, PaginatedResponse};

use crate::api::{ApiResult, json_body, path, query};
use crate::auth::{Action, CurrentUser, Resource, require};
use crate::core::ServerState;
use crate::db::repository::stock;
use crate::services::ledger;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_optional_text};

const DENIED: &str = "Only managers can access inventory";

/// GET /api/v1/inventory
pub async fn list(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    params: Result<Query<InventoryQuery>, QueryRejection>,
) -> ApiResult<Json<PaginatedResponse<Stock>>> {
    require(&current_user, Action::Read, Resource::Inventory, DENIED)?;
    let params = query(params)?;
    let page = PageQuery {
        page: params.page,
        limit: params.limit,
    };
    let search = params.search.as_deref().filter(|s| !s.trim().is_empty());
    let (rows, total) = stock::list(&state.pool, search, &page).await?;
    Ok(Json(PaginatedResponse::new(rows, total, page.page(), page.limit())))
}

/// GET /api/v1/inventory/movements
pub async fn movements(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    params: Result<Query<MovementQuery>, QueryRejection>,
) -> ApiResult<Json<PaginatedResponse<StockMovement>>> {
    require(&current_user, Action::Read, Resource::Inventory, DENIED)?;
    let params = query(params)?;
    let page = PageQuery {
        page: params.page,
        limit: params.limit,
    };
    let (rows, total) = stock::movements(&state.pool, params.variant_id, &page).await?;
    Ok(Json(PaginatedResponse::new(rows, total, page.page(), page.limit())))
}

/// GET /api/v1/inventory/{variantId}
pub async fn get_by_variant(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    variant_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Stock>> {
    require(&current_user, Action::Read, Resource::Inventory, DENIED)?;
    let variant_id = path(variant_id)?;
    let found = stock::find_by_variant(&state.pool, variant_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::StockNotFound,
                format!("Stock for variant {variant_id} not found"),
            )
        })?;
    Ok(Json(found))
}

/// POST /api/v1/inventory/adjust
pub async fn adjust(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    payload: Result<Json<AdjustStockRequest>, JsonRejection>,
) -> ApiResult<Json<Stock>> {
    require(&current_user, Action::Write, Resource::Inventory, DENIED)?;
    let request = json_body(payload)?;
    validate_optional_text(&request.location, "location", MAX_SHORT_TEXT_LEN)?;

    let adjusted = ledger::adjust(
        &state.pool,
        request.variant_id,
        request.quantity,
        request.location.as_deref(),
    )
    .await?;
    tracing::debug!(
        adjusted_by = current_user.id,
        variant_id = adjusted.variant_id,
        "Adjustment requested"
    );
    Ok(Json(adjusted))
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use serde_json::json;

    use crate::api::test_support::{app, login_as, send};
    use crate::db::test_support::seed_variant;

    #[tokio::test]
    async fn test_adjust_and_read_back() {
        let (app, state) = app().await;
        let (_, manager) = login_as(&state, "boss@example.com", "MANAGER").await;
        let (_, customer) = login_as(&state, "ann@example.com", "USER").await;
        let variant_id = seed_variant(&state.pool, "LAMP", 40.0, 2).await;

        let (status, _) = send(&app, Method::GET, "/api/v1/inventory", Some(&customer), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, stock) = send(
            &app,
            Method::POST,
            "/api/v1/inventory/adjust",
            Some(&manager),
            Some(json!({"variantId": variant_id, "quantity": 9, "location": "B-2"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stock["quantity"], 9);
        assert_eq!(stock["location"], "B-2");

        let (status, page) = send(
            &app,
            Method::GET,
            &format!("/api/v1/inventory/movements?variantId={variant_id}"),
            Some(&manager),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["total"], 1);
        assert_eq!(page["data"][0]["reason"], "MANUAL_ADJUST");
        assert_eq!(page["data"][0]["change"], 7);

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/v1/inventory/{}", variant_id + 100),
            Some(&manager),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], format!("Stock for variant {} not found", variant_id + 100));
    }
}
