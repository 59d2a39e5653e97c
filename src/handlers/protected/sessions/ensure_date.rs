use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::HeaderMap,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::MaterializationReport;
use crate::sessions::parse_date;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EnsureDateQuery {
    pub date: Option<String>,
}

/// POST /api/sessions/ensure?date=YYYY-MM-DD
pub async fn ensure_date(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<EnsureDateQuery>, QueryRejection>,
) -> ApiResult<MaterializationReport> {
    handle(state, headers, None, query).await
}

/// POST /api/tenants/:tenant/sessions/ensure?date=YYYY-MM-DD
pub async fn ensure_date_for_tenant(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    headers: HeaderMap,
    query: Result<Query<EnsureDateQuery>, QueryRejection>,
) -> ApiResult<MaterializationReport> {
    handle(state, headers, Some(tenant), query).await
}

async fn handle(
    state: AppState,
    headers: HeaderMap,
    tenant_hint: Option<String>,
    query: Result<Query<EnsureDateQuery>, QueryRejection>,
) -> ApiResult<MaterializationReport> {
    let tenant_id = state.tenants.resolve(&headers, tenant_hint.as_deref())?;
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let date = effective_date(query.date.as_deref())?;

    let report = state.materializer.ensure_for_date(tenant_id, date).await?;
    Ok(ApiResponse::success(report))
}

/// Missing or blank `date` means today in the server's local timezone
fn effective_date(raw: Option<&str>) -> Result<NaiveDate, crate::sessions::SessionError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => parse_date("date", value),
        None => Ok(Local::now().date_naive()),
    }
}
