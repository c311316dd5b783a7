// HTTP-edge error types
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use std::collections::HashMap;

use crate::auth::SessionError;
use crate::database::{DatabaseError, RecordError, SchemaError};
use crate::filter::FilterError;
use crate::services::UserError;
use crate::views;

/// Request failure rendered as an HTML error page
#[derive(Debug)]
pub enum AppError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ValidationError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Client-safe message; internal details stay in the log
    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest(msg) => msg,
            AppError::ValidationError { message, .. } => message,
            AppError::NotFound(msg) => msg,
            AppError::Conflict(msg) => msg,
            AppError::InternalServerError(_) => "Something went wrong. Please try again.",
            AppError::ServiceUnavailable(msg) => msg,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::InternalServerError(message.into())
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), message.clone());
        AppError::ValidationError {
            message,
            field_errors: Some(field_errors),
        }
    }

    /// `(field, message)` of a validation failure, for re-rendering a form
    pub fn field_error(&self) -> Option<(String, String)> {
        match self {
            AppError::ValidationError { message, field_errors } => {
                let field = field_errors
                    .as_ref()
                    .and_then(|errors| errors.keys().next().cloned())
                    .unwrap_or_default();
                Some((field, message.clone()))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::InternalServerError(detail) => write!(f, "Internal error: {}", detail),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let AppError::InternalServerError(detail) = &self {
            tracing::error!("Internal server error: {}", detail);
        }
        (status, Html(views::error_page(status.as_u16(), self.message()))).into_response()
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => AppError::NotFound(msg),
            DatabaseError::Constraint(msg) => AppError::ValidationError {
                message: constraint_notice(&msg),
                field_errors: None,
            },
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::InternalServerError(format!("Session error: {}", err))
    }
}

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        AppError::validation(err.field(), err.to_string())
    }
}

impl From<FilterError> for AppError {
    fn from(err: FilterError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Database(db) => db.into(),
            UserError::NotFound(email) => AppError::NotFound(format!("User not found: {}", email)),
            UserError::AlreadyExists(email) => AppError::Conflict(format!("User already exists: {}", email)),
            UserError::InvalidEmail(msg) => AppError::validation("email", msg),
            UserError::WeakPassword => AppError::validation("password", UserError::WeakPassword.to_string()),
            UserError::Auth(auth) => AppError::InternalServerError(auth.to_string()),
        }
    }
}

impl From<SchemaError> for AppError {
    fn from(err: SchemaError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

/// User-facing wording for a storage constraint failure.
fn constraint_notice(detail: &str) -> String {
    if detail.starts_with("FOREIGN KEY") {
        "This record is referenced by other records or refers to a record that does not exist.".to_string()
    } else if detail.starts_with("UNIQUE") {
        "A record with these values already exists.".to_string()
    } else {
        format!("The submitted values were rejected: {}", detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_errors_keep_their_field() {
        let err: AppError = RecordError::MissingRequiredField("name".into()).into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.field_error(),
            Some(("name".to_string(), "Missing required field: name".to_string()))
        );
    }

    #[test]
    fn storage_errors_map_to_statuses() {
        let not_found: AppError = DatabaseError::NotFound("Property #9 not found".into()).into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let fk: AppError = DatabaseError::Constraint("FOREIGN KEY constraint failed".into()).into();
        assert_eq!(fk.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(fk.message().contains("referenced"));

        let internal: AppError = DatabaseError::QueryError("near \"SELEC\": syntax error".into()).into();
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!internal.message().contains("SELEC"));
    }
}
