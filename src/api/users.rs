use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use haap_core::models::{
    ContactMethod, EnrollmentOptIn, RegisterParentInput, RegisterStaffInput, RegisterUserInput, User,
    UserDirectory,
};
use haap_core::HaapError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require_admin, ApiResult, AppState, CurrentActor};

pub async fn register_parent(
    State(state): State<AppState>,
    Json(input): Json<RegisterParentInput>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.db.register_parent(input, state.notifier.as_ref())?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Target of the WhatsApp verification link.
pub async fn verify_parent(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    if !state.db.verify_parent(id)? {
        return Err(HaapError::not_found("parent", id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn register_staff(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(input): Json<RegisterStaffInput>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.db.register_staff(&actor, input, state.notifier.as_ref())?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn register_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(input): Json<RegisterUserInput>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.db.register_user(&actor, input, state.notifier.as_ref())?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn directory(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<UserDirectory>> {
    Ok(Json(state.db.user_directory(&actor)?))
}

#[derive(Debug, Deserialize)]
pub struct WhatsAppQuery {
    #[serde(default)]
    number: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WhatsAppAvailability {
    pub exists: bool,
}

pub async fn check_whatsapp(
    State(state): State<AppState>,
    Query(query): Query<WhatsAppQuery>,
) -> ApiResult<Json<WhatsAppAvailability>> {
    let exists = state.db.whatsapp_number_exists(&query.number)?;
    Ok(Json(WhatsAppAvailability { exists }))
}

pub async fn get_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    if actor.user_id != id {
        require_admin(&actor)?;
    }
    let user = state.db.get_user(id)?.ok_or_else(|| HaapError::not_found("user", id))?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_admin(&actor)?;
    if !state.db.delete_user(id)? {
        return Err(HaapError::not_found("user", id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ImageInput {
    path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageReplaced {
    /// Previous upload the caller should remove from file storage.
    pub previous: Option<String>,
}

pub async fn replace_image(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(input): Json<ImageInput>,
) -> ApiResult<Json<ImageReplaced>> {
    let previous = state.db.replace_profile_image(&actor, &input.path)?;
    Ok(Json(ImageReplaced { previous }))
}

#[derive(Debug, Deserialize)]
pub struct OptInInput {
    contact_method: ContactMethod,
}

pub async fn opt_in_enrollment(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(input): Json<OptInInput>,
) -> ApiResult<Json<EnrollmentOptIn>> {
    Ok(Json(state.db.opt_in_enrollment(&actor, input.contact_method)?))
}
