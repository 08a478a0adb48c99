use axum::{
    extract::{Query, State},
    Json,
};
use haap_core::models::{ChildrenReport, Dashboard, Page, ParentExport, ParentQuery, SelectionInput, User};
use serde::Deserialize;

use super::{ApiResult, AppState, CurrentActor};

pub async fn children_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(filter): Query<SelectionInput>,
) -> ApiResult<Json<ChildrenReport>> {
    Ok(Json(state.db.children_report(&actor, &filter)?))
}

pub async fn dashboard(State(state): State<AppState>, CurrentActor(actor): CurrentActor) -> ApiResult<Json<Dashboard>> {
    Ok(Json(state.db.dashboard(&actor)?))
}

pub async fn list_parents(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<ParentQuery>,
) -> ApiResult<Json<Page<User>>> {
    Ok(Json(state.db.list_parents(&actor, &query)?))
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    municipality: Option<String>,
}

/// Table data for the parent list; the PDF itself is rendered downstream.
pub async fn parents_export(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Json<ParentExport>> {
    Ok(Json(state.db.parents_export(&actor, query.municipality.as_deref())?))
}
