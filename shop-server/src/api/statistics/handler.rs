//! Statistics API Handlers

use axum::extract::rejection::QueryRejection;
use axum::{
    Json,
    extract::{Query, State},
};
use shared::AppError;
use shared::models::{
    AdminOverview, CategorySales, Conversion, PeriodSales, SkuSales, StatisticsQuery,
};

use crate::api::{ApiResult, query};
use crate::auth::{Action, CurrentUser, Resource, require};
use crate::core::ServerState;
use crate::db::repository::statistics::{self, StatsFilter};

const DENIED: &str = "Only administrators can view statistics";

const DEFAULT_TOP_SKU_LIMIT: u32 = 10;
const MAX_TOP_SKU_LIMIT: u32 = 50;

fn parse_date(value: Option<&str>, field: &str) -> Result<Option<i64>, AppError> {
    match value {
        None => Ok(None),
        Some(raw) => shared::util::parse_rfc3339_millis(raw)
            .map(Some)
            .ok_or_else(|| AppError::validation(format!("{field} must be an RFC 3339 timestamp"))),
    }
}

/// Authorize and turn the query into repository filters
fn prepare(
    current_user: &CurrentUser,
    params: Result<Query<StatisticsQuery>, QueryRejection>,
) -> ApiResult<(StatisticsQuery, StatsFilter)> {
    require(current_user, Action::Read, Resource::Statistics, DENIED)?;
    let params = query(params)?;
    let start = parse_date(params.start_date.as_deref(), "startDate")?;
    let end = parse_date(params.end_date.as_deref(), "endDate")?;
    if let (Some(start), Some(end)) = (start, end)
        && start > end
    {
        return Err(AppError::validation("startDate must not be after endDate"));
    }
    let filter = StatsFilter {
        start,
        end,
        category_id: params.category_id,
        status: params.status,
    };
    Ok((params, filter))
}

/// GET /api/v1/statistics/admin-overview
pub async fn overview(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    params: Result<Query<StatisticsQuery>, QueryRejection>,
) -> ApiResult<Json<AdminOverview>> {
    let (_, filter) = prepare(&current_user, params)?;
    let pool = &state.pool;
    Ok(Json(AdminOverview {
        totals: statistics::totals(pool, &filter).await?,
        revenue_by_status: statistics::revenue_by_status(pool, &filter).await?,
        top_categories: statistics::top_categories(pool).await?,
        recent_orders: statistics::recent_orders(pool, &filter).await?,
    }))
}

/// GET /api/v1/statistics/sales/periods
pub async fn sales_by_period(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    params: Result<Query<StatisticsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<PeriodSales>>> {
    let (params, filter) = prepare(&current_user, params)?;
    let interval = params.interval.unwrap_or_default();
    Ok(Json(statistics::sales_by_period(&state.pool, &filter, interval).await?))
}

/// GET /api/v1/statistics/sales/categories
pub async fn sales_by_category(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    params: Result<Query<StatisticsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<CategorySales>>> {
    let (_, filter) = prepare(&current_user, params)?;
    Ok(Json(statistics::sales_by_category(&state.pool, &filter).await?))
}

/// GET /api/v1/statistics/sales/top-sku
pub async fn top_skus(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    params: Result<Query<StatisticsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<SkuSales>>> {
    let (params, filter) = prepare(&current_user, params)?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_TOP_SKU_LIMIT)
        .clamp(1, MAX_TOP_SKU_LIMIT);
    Ok(Json(statistics::top_skus(&state.pool, &filter, limit).await?))
}

/// GET /api/v1/statistics/conversion
pub async fn conversion(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    params: Result<Query<StatisticsQuery>, QueryRejection>,
) -> ApiResult<Json<Conversion>> {
    let (_, filter) = prepare(&current_user, params)?;
    Ok(Json(statistics::conversion(&state.pool, &filter).await?))
}
