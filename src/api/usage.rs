use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use haap_core::models::{AppUsageLog, CreateUsageLogInput, Page, UsageLogQuery};

use super::{ApiResult, AppState, CurrentActor};

/// Activity reported by the mobile app.
pub async fn record(
    State(state): State<AppState>,
    Json(input): Json<CreateUsageLogInput>,
) -> ApiResult<(StatusCode, Json<AppUsageLog>)> {
    let log = state.db.record_usage(input)?;
    Ok((StatusCode::CREATED, Json(log)))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<UsageLogQuery>,
) -> ApiResult<Json<Page<AppUsageLog>>> {
    Ok(Json(state.db.list_usage_logs(&actor, &query)?))
}
