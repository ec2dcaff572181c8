use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures raised by the entity stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store rejected a mutation; the transaction was rolled back.
    #[error("Error {operation} entity: {source}")]
    Write {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// The store rejected a query.
    #[error("Error {operation}: {source}")]
    Read {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// A mutation was requested for an entity that has never been persisted.
    #[error("Entity has no id while {operation}")]
    MissingId { operation: &'static str },
}

impl StoreError {
    pub fn write(operation: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| StoreError::Write { operation, source }
    }

    pub fn read(operation: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| StoreError::Read { operation, source }
    }

    /// Column name of a violated UNIQUE constraint, e.g. `users.login`.
    pub fn unique_violation(&self) -> Option<&str> {
        let StoreError::Write {
            source: sqlx::Error::Database(db),
            ..
        } = self
        else {
            return None;
        };
        if !db.is_unique_violation() {
            return None;
        }
        db.message().rsplit(": ").next()
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("User not found")]
    UserNotFound,

    #[error("Role not found")]
    RoleNotFound,

    #[error("You cannot delete your own account")]
    SelfDeletion,

    #[error("Role is still assigned to users")]
    RoleInUse,

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Password error: {0}")]
    Password(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }
}

// Convert AppError to an HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "Validation failed".into()),
            AppError::UserNotFound | AppError::RoleNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::SelfDeletion | AppError::RoleInUse => (StatusCode::CONFLICT, self.to_string()),
            AppError::Auth(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error".into()),
            AppError::Password(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        };

        if status.is_server_error() {
            tracing::error!(error = ?self);
        } else {
            tracing::debug!(error = %self);
        }

        let details = match self {
            AppError::Validation(errors) => errors,
            _ => Vec::new(),
        };
        let body = Json(ErrorResponse {
            error: error_message,
            details,
        });

        (status, body).into_response()
    }
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

pub type Result<T> = std::result::Result<T, AppError>;
