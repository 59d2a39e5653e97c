use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::HeaderMap,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::MaterializationReport;
use crate::sessions::DateRange;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EnsureRangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// POST /api/sessions/ensure-range?from=YYYY-MM-DD&to=YYYY-MM-DD
pub async fn ensure_range(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<EnsureRangeQuery>, QueryRejection>,
) -> ApiResult<MaterializationReport> {
    handle(state, headers, None, query).await
}

/// POST /api/tenants/:tenant/sessions/ensure-range?from=YYYY-MM-DD&to=YYYY-MM-DD
pub async fn ensure_range_for_tenant(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    headers: HeaderMap,
    query: Result<Query<EnsureRangeQuery>, QueryRejection>,
) -> ApiResult<MaterializationReport> {
    handle(state, headers, Some(tenant), query).await
}

async fn handle(
    state: AppState,
    headers: HeaderMap,
    tenant_hint: Option<String>,
    query: Result<Query<EnsureRangeQuery>, QueryRejection>,
) -> ApiResult<MaterializationReport> {
    let tenant_id = state.tenants.resolve(&headers, tenant_hint.as_deref())?;
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let range = DateRange::parse(query.from.as_deref(), query.to.as_deref())?;

    let report = state.materializer.ensure_for_range(tenant_id, range).await?;
    Ok(ApiResponse::success(report))
}
