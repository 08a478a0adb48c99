use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use haap_core::models::{CascadeOptions, CreateLocationInput, Level, LocationNode, SelectionInput};
use haap_core::HaapError;
use serde::Deserialize;

use super::{require_admin, ApiResult, AppState, CurrentActor};

/// Raw dropdown parameters; any malformed value yields an empty list.
#[derive(Debug, Default, Deserialize)]
pub struct ParentParams {
    #[serde(default)]
    municipality_id: Option<String>,
    #[serde(default)]
    administrative_post_id: Option<String>,
    #[serde(default)]
    suco_id: Option<String>,
}

fn children_of(state: &AppState, parent_level: Level, raw: Option<&str>) -> ApiResult<Json<Vec<LocationNode>>> {
    Ok(Json(state.db.children_of(parent_level, raw.unwrap_or(""))?))
}

pub async fn municipalities(State(state): State<AppState>) -> ApiResult<Json<Vec<LocationNode>>> {
    Ok(Json(state.db.list_municipalities()?))
}

pub async fn administrative_posts(
    State(state): State<AppState>,
    Query(params): Query<ParentParams>,
) -> ApiResult<Json<Vec<LocationNode>>> {
    children_of(&state, Level::Municipality, params.municipality_id.as_deref())
}

pub async fn sucos(
    State(state): State<AppState>,
    Query(params): Query<ParentParams>,
) -> ApiResult<Json<Vec<LocationNode>>> {
    children_of(&state, Level::AdministrativePost, params.administrative_post_id.as_deref())
}

pub async fn aldeias(
    State(state): State<AppState>,
    Query(params): Query<ParentParams>,
) -> ApiResult<Json<Vec<LocationNode>>> {
    children_of(&state, Level::Suco, params.suco_id.as_deref())
}

pub async fn cascade(
    State(state): State<AppState>,
    Query(selection): Query<SelectionInput>,
) -> ApiResult<Json<CascadeOptions>> {
    Ok(Json(state.db.cascade(&selection)?))
}

pub async fn create_node(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(input): Json<CreateLocationInput>,
) -> ApiResult<(StatusCode, Json<LocationNode>)> {
    require_admin(&actor)?;
    let node = state.db.create_node(input.level, &input.name, input.parent_id)?;
    Ok((StatusCode::CREATED, Json(node)))
}

pub async fn delete_node(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((level, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    require_admin(&actor)?;
    let missing = || HaapError::not_found("location", format!("{}/{}", level, id));
    let level = Level::from_str(&level).ok_or_else(missing)?;
    let id = id.parse::<i64>().map_err(|_| missing())?;
    if !state.db.delete_node(level, id)? {
        return Err(missing().into());
    }
    Ok(StatusCode::NO_CONTENT)
}
