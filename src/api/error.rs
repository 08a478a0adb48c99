use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use haap_core::HaapError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing or unknown x-user-id header")]
    Unauthenticated,

    #[error("{0}")]
    Core(#[from] HaapError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Core(err) => match err {
                HaapError::DuplicateName { .. } => StatusCode::CONFLICT,
                HaapError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                HaapError::NotFound { .. } => StatusCode::NOT_FOUND,
                HaapError::Permission(_) => StatusCode::FORBIDDEN,
                HaapError::Storage(_) | HaapError::LockPoisoned | HaapError::Config(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = match self {
            ApiError::Core(HaapError::Validation { field, message }) => ErrorBody {
                error: message,
                field: Some(field),
            },
            other => ErrorBody {
                error: other.to_string(),
                field: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
