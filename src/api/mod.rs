//! JSON HTTP adapter over `haap-core`.
//!
//! Authentication happens upstream; the acting user arrives as a UUID in the
//! `x-user-id` header and is loaded into an [`Actor`] per request.

mod apk;
mod children;
mod error;
mod locations;
mod reports;
mod usage;
mod users;

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    routing::{delete, get, post, put},
    Router,
};
use haap_core::models::{Actor, Role};
use haap_core::{Database, HaapError, Notifier};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

pub use error::{ApiError, ApiResult};

pub const USER_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(db: Database, notifier: Arc<dyn Notifier>) -> Self {
        Self { db, notifier }
    }
}

/// The acting user for a request.
pub struct CurrentActor(pub Actor);

impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .ok_or(ApiError::Unauthenticated)?;

        match state.db.actor(user_id) {
            Ok(actor) => Ok(CurrentActor(actor)),
            Err(HaapError::NotFound { .. }) => Err(ApiError::Unauthenticated),
            Err(e) => Err(e.into()),
        }
    }
}

pub(crate) fn require_admin(actor: &Actor) -> ApiResult<()> {
    if actor.role != Role::MoeAdmin {
        return Err(HaapError::Permission(format!(
            "{} cannot manage this resource",
            actor.role.display_name()
        ))
        .into());
    }
    Ok(())
}

async fn health() -> &'static str {
    "OK"
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Location hierarchy and cascading dropdowns
        .route("/api/locations", post(locations::create_node))
        .route("/api/locations/cascade", get(locations::cascade))
        .route("/api/locations/municipalities", get(locations::municipalities))
        .route("/api/locations/administrative-posts", get(locations::administrative_posts))
        .route("/api/locations/sucos", get(locations::sucos))
        .route("/api/locations/aldeias", get(locations::aldeias))
        .route("/api/locations/{level}/{id}", delete(locations::delete_node))
        // Users
        .route("/api/parents/register", post(users::register_parent))
        .route("/api/parents/{id}/verify", post(users::verify_parent))
        .route("/api/parents", get(reports::list_parents))
        .route("/api/parents/export", get(reports::parents_export))
        .route("/api/staff", post(users::register_staff))
        .route("/api/users", get(users::directory).post(users::register_user))
        .route("/api/users/check-whatsapp", get(users::check_whatsapp))
        .route("/api/users/me/image", put(users::replace_image))
        .route("/api/users/{id}", get(users::get_user).delete(users::delete_user))
        .route("/api/enrollment", post(users::opt_in_enrollment))
        // Children and activity
        .route("/api/children", get(children::list).post(children::register))
        .route("/api/children/{id}", put(children::update).delete(children::delete))
        .route("/api/usage-logs", get(usage::list).post(usage::record))
        // Releases
        .route("/api/apks", get(apk::list).post(apk::publish))
        .route("/api/apks/latest", get(apk::latest))
        .route("/api/apks/{id}", put(apk::update))
        // Reports
        .route("/api/reports/children", get(reports::children_report))
        .route("/api/dashboard", get(reports::dashboard))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
