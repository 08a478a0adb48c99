use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use haap_core::models::{ApkVersion, PublishApkInput, UpdateApkInput};
use haap_core::HaapError;
use uuid::Uuid;

use super::{ApiResult, AppState, CurrentActor};

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<ApkVersion>>> {
    Ok(Json(state.db.list_apks()?))
}

pub async fn latest(State(state): State<AppState>) -> ApiResult<Json<ApkVersion>> {
    let apk = state
        .db
        .latest_apk()?
        .ok_or_else(|| HaapError::not_found("apk_version", "latest"))?;
    Ok(Json(apk))
}

pub async fn publish(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(input): Json<PublishApkInput>,
) -> ApiResult<(StatusCode, Json<ApkVersion>)> {
    let apk = state.db.publish_apk(&actor, input)?;
    Ok((StatusCode::CREATED, Json(apk)))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateApkInput>,
) -> ApiResult<Json<ApkVersion>> {
    let apk = state
        .db
        .update_apk(&actor, id, input)?
        .ok_or_else(|| HaapError::not_found("apk_version", id))?;
    Ok(Json(apk))
}
