use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum BookmarksError {
    #[error("bookmark already exists")]
    AlreadyExists,

    #[error("bookmark does not exist")]
    DoesNotExist,

    #[error("the model '{0}' is already being handled")]
    AlreadyHandled(String),

    #[error("the model '{0}' is not currently being handled")]
    NotHandled(String),

    #[error("unknown content type '{0}'")]
    UnknownContentType(String),

    #[error("'{0}' is not a valid SQL identifier")]
    InvalidIdentifier(String),

    #[error("current user is not authenticated")]
    NotAuthenticated,

    #[error("database error: {0}")]
    Database(#[from] SqlxError),
}

impl BookmarksError {
    /// Map a sqlx insert error, translating unique-constraint violations
    /// into `AlreadyExists`. The database constraint is the real guarantee;
    /// application-level existence checks are a convenience only.
    pub fn from_insert(e: SqlxError) -> Self {
        match &e {
            SqlxError::Database(db) if db.is_unique_violation() => BookmarksError::AlreadyExists,
            _ => BookmarksError::Database(e),
        }
    }
}

impl IntoResponse for BookmarksError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match &self {
            BookmarksError::AlreadyExists
            | BookmarksError::DoesNotExist
            | BookmarksError::UnknownContentType(_)
            | BookmarksError::NotAuthenticated => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "BAD_REQUEST".to_string(),
                    message: self.to_string(),
                },
            ),
            BookmarksError::AlreadyHandled(_)
            | BookmarksError::NotHandled(_)
            | BookmarksError::InvalidIdentifier(_)
            | BookmarksError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                },
            ),
        };
        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
