//! Error types for haap-core

use rusqlite::ffi;
use thiserror::Error;

use crate::models::Level;

#[derive(Error, Debug)]
pub enum HaapError {
    #[error("{level} '{name}' already exists")]
    DuplicateName { level: Level, name: String },

    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, HaapError>;

impl HaapError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// True when the store rejected a write because of a UNIQUE constraint.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && (e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
    )
}
