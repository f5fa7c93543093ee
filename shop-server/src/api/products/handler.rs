//! Product API Handlers

use std::collections::HashSet;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::models::{Product, ProductCreate, ProductQuery, ProductUpdate, VariantInput};
use shared::{AppError, ErrorCode, PageQuery, PaginatedResponse};

use crate::api::{ApiResult, duplicate_as, json_body, path, query};
use crate::auth::{Action, CurrentUser, Resource, require};
use crate::core::ServerState;
use crate::db::repository::product::{self, ProductFilter};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_price,
    validate_price_range, validate_required_text,
};

const WRITE_DENIED: &str = "Only managers can change the catalog";

fn validate_variants(variants: &[VariantInput]) -> Result<(), AppError> {
    let mut skus = HashSet::new();
    for variant in variants {
        validate_required_text(&variant.name, "variant name", MAX_NAME_LEN)?;
        validate_required_text(&variant.sku, "sku", MAX_SHORT_TEXT_LEN)?;
        validate_price(variant.price, "price")?;
        if !skus.insert(variant.sku.as_str()) {
            return Err(AppError::validation(format!(
                "SKU '{}' is listed more than once",
                variant.sku
            )));
        }
    }
    Ok(())
}

/// GET /api/v1/products
pub async fn list(
    State(state): State<ServerState>,
    params: Result<Query<ProductQuery>, QueryRejection>,
) -> ApiResult<Json<PaginatedResponse<Product>>> {
    let params = query(params)?;
    validate_price_range(params.min_price, params.max_price)?;

    let page = PageQuery {
        page: params.page,
        limit: params.limit,
    };
    let filter = ProductFilter {
        search: params.search.as_deref().filter(|s| !s.trim().is_empty()),
        category_id: params.category_id,
        min_price: params.min_price,
        max_price: params.max_price,
        sort: params.sort.unwrap_or_default(),
    };
    let (rows, total) = product::list(&state.pool, &filter, &page).await?;
    Ok(Json(PaginatedResponse::new(rows, total, page.page(), page.limit())))
}

/// GET /api/v1/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Product>> {
    let id = path(id)?;
    let found = product::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found"))
    })?;
    Ok(Json(found))
}

/// POST /api/v1/products
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    payload: Result<Json<ProductCreate>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    require(&current_user, Action::Write, Resource::Catalog, WRITE_DENIED)?;
    let data = json_body(payload)?;
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
    validate_variants(&data.variants)?;

    let created = product::create(&state.pool, &data, shared::util::now_millis())
        .await
        .map_err(duplicate_as(ErrorCode::VariantSkuExists))?;
    tracing::info!(
        product_id = created.id,
        variants = created.variants.len(),
        "Product created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/products/{id}
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProductUpdate>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    require(&current_user, Action::Write, Resource::Catalog, WRITE_DENIED)?;
    let id = path(id)?;
    let data = json_body(payload)?;
    if let Some(name) = &data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
    if let Some(variants) = &data.variants {
        validate_variants(variants)?;
    }

    let updated = product::update(&state.pool, id, &data, shared::util::now_millis())
        .await
        .map_err(duplicate_as(ErrorCode::VariantSkuExists))?;
    Ok(Json(updated))
}
