//! Category API Handlers

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::models::{Category, CategoryCreate, CategoryDetail, CategoryQuery, CategoryUpdate};
use shared::{AppError, ErrorCode, PageQuery, PaginatedResponse};

use crate::api::{ApiResult, duplicate_as, json_body, path, query};
use crate::auth::{Action, CurrentUser, Resource, require};
use crate::core::ServerState;
use crate::db::repository::category;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text, validate_slug,
};

const WRITE_DENIED: &str = "Only managers can change the catalog";

/// GET /api/v1/categories
pub async fn list(
    State(state): State<ServerState>,
    params: Result<Query<CategoryQuery>, QueryRejection>,
) -> ApiResult<Json<PaginatedResponse<Category>>> {
    let params = query(params)?;
    let page = PageQuery {
        page: params.page,
        limit: params.limit,
    };
    let search = params.search.as_deref().filter(|s| !s.trim().is_empty());
    let (rows, total) = category::list(&state.pool, search, &page).await?;
    Ok(Json(PaginatedResponse::new(rows, total, page.page(), page.limit())))
}

/// GET /api/v1/categories/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<CategoryDetail>> {
    let id = path(id)?;
    let found = category::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::CategoryNotFound, format!("Category {id} not found"))
    })?;
    let products = category::products(&state.pool, id).await?;
    Ok(Json(CategoryDetail {
        category: found,
        products,
    }))
}

/// POST /api/v1/categories
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    payload: Result<Json<CategoryCreate>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    require(&current_user, Action::Write, Resource::Catalog, WRITE_DENIED)?;
    let data = json_body(payload)?;
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_slug(&data.slug)?;
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;

    let created = category::create(&state.pool, &data, shared::util::now_millis())
        .await
        .map_err(duplicate_as(ErrorCode::CategorySlugExists))?;
    tracing::info!(category_id = created.id, slug = %created.slug, "Category created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/categories/{id}
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CategoryUpdate>, JsonRejection>,
) -> ApiResult<Json<Category>> {
    require(&current_user, Action::Write, Resource::Catalog, WRITE_DENIED)?;
    let id = path(id)?;
    let data = json_body(payload)?;
    if let Some(name) = &data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(slug) = &data.slug {
        validate_slug(slug)?;
    }
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;

    let updated = category::update(&state.pool, id, &data, shared::util::now_millis())
        .await
        .map_err(duplicate_as(ErrorCode::CategorySlugExists))?;
    Ok(Json(updated))
}
