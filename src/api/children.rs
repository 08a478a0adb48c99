use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use haap_core::models::{Child, CreateChildInput, UpdateChildInput};
use uuid::Uuid;

use super::{ApiResult, AppState, CurrentActor};

pub async fn list(State(state): State<AppState>, CurrentActor(actor): CurrentActor) -> ApiResult<Json<Vec<Child>>> {
    Ok(Json(state.db.children_for_parent(&actor)?))
}

pub async fn register(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(input): Json<CreateChildInput>,
) -> ApiResult<(StatusCode, Json<Child>)> {
    let child = state.db.register_child(&actor, input)?;
    Ok((StatusCode::CREATED, Json(child)))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateChildInput>,
) -> ApiResult<Json<Child>> {
    Ok(Json(state.db.update_child(&actor, id, input)?))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.db.delete_child(&actor, id)?;
    Ok(StatusCode::NO_CONTENT)
}
