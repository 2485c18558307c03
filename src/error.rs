use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Machine-readable error category, sent alongside the prose message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Unauthorized,
    Forbidden,
    Conflict,
    NotFound,
    /// A write was rejected by the store; still reported as 400
    Storage,
    Internal,
}

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Email already exists")]
    EmailTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("Wrong password")]
    WrongPassword,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Note doesn't exist")]
    NoteNotFound,

    #[error("Not your note")]
    NotYourNote,

    #[error("File already exists")]
    NoteNameTaken,

    #[error("Note update failed: {0}")]
    UpdateFailed(sqlx::Error),

    #[error("Short url already in use")]
    ShortUrlCollision,

    #[error("Could not generate a unique short url after {0} attempts")]
    ShortUrlExhausted(u32),
}

impl AppError {
    /// Category reported to clients
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Database(_)
            | AppError::TaskJoin(_)
            | AppError::PasswordHash(_)
            | AppError::Signing(_)
            | AppError::ShortUrlCollision
            | AppError::ShortUrlExhausted(_) => ErrorKind::Internal,
            AppError::InvalidInput(_) => ErrorKind::Validation,
            AppError::UpdateFailed(_) => ErrorKind::Storage,
            AppError::UserNotFound | AppError::WrongPassword | AppError::NotLoggedIn => {
                ErrorKind::Unauthorized
            }
            AppError::NotYourNote => ErrorKind::Forbidden,
            AppError::EmailTaken | AppError::NoteNameTaken => ErrorKind::Conflict,
            AppError::NoteNotFound => ErrorKind::NotFound,
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation
            | ErrorKind::Conflict
            | ErrorKind::NotFound
            | ErrorKind::Storage => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();

        let error_message = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                "Internal server error".to_string()
            }
            AppError::TaskJoin(ref e) => {
                tracing::error!("Task join error: {:?}", e);
                "Internal server error".to_string()
            }
            AppError::PasswordHash(ref e) => {
                tracing::error!("Password hashing error: {}", e);
                "Internal server error".to_string()
            }
            AppError::Signing(ref e) => {
                tracing::error!("Signing error: {}", e);
                "Internal server error".to_string()
            }
            AppError::ShortUrlCollision => {
                tracing::error!("Short url collision escaped the retry loop");
                "Internal server error".to_string()
            }
            AppError::ShortUrlExhausted(attempts) => {
                tracing::error!("Short url space exhausted after {} attempts", attempts);
                "Internal server error".to_string()
            }
            AppError::UpdateFailed(ref e) => {
                tracing::warn!("Note update failed: {:?}", e);
                "Something went wrong".to_string()
            }
            AppError::InvalidInput(msg) => msg,
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
            "kind": kind,
        }));

        (status, body).into_response()
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_are_unauthorized() {
        assert_eq!(AppError::NotLoggedIn.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::UserNotFound.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::WrongPassword.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_conflict_and_missing_are_bad_request() {
        assert_eq!(AppError::EmailTaken.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NoteNameTaken.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NoteNotFound.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NoteNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(AppError::EmailTaken.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_owner_mismatch_is_forbidden() {
        assert_eq!(AppError::NotYourNote.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotYourNote.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_update_failure_is_bad_request() {
        let err = AppError::UpdateFailed(sqlx::Error::RowNotFound);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_ne!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_url_collision_is_internal() {
        assert_eq!(AppError::ShortUrlCollision.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_exhaustion_is_internal() {
        let err = AppError::ShortUrlExhausted(16);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(ErrorKind::NotFound).unwrap(),
            json!("not_found")
        );
        assert_eq!(
            serde_json::to_value(ErrorKind::Storage).unwrap(),
            json!("storage")
        );
    }
}
