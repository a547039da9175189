//! HTTP error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Request being served when a core error occurred; picks the fallback message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SubmitReview,
    ListReports,
    GetReport,
}

impl Operation {
    fn failure_message(&self) -> &'static str {
        match self {
            Operation::SubmitReview => "Failed to save review",
            Operation::ListReports => "Failed to fetch reports",
            Operation::GetReport => "Failed to fetch report",
        }
    }
}

/// Application error type.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Upload exceeds the configured limit.
    #[error("Uploaded file is too large")]
    PayloadTooLarge,

    /// Failure reported by a workflow.
    #[error("{source}")]
    Core {
        operation: Operation,
        source: critic_core::Error,
        expose_details: bool,
    },
}

/// Error response body.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
}

impl ErrorBody {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            fix: None,
            sql: None,
        }
    }
}

impl ApiError {
    pub fn core(operation: Operation, source: critic_core::Error, expose_details: bool) -> Self {
        Self::Core {
            operation,
            source,
            expose_details,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        use critic_core::Error as Core;

        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Core { source, .. } => match source {
                Core::Validation(_) => StatusCode::BAD_REQUEST,
                Core::NotFound(_) => StatusCode::NOT_FOUND,
                Core::Forbidden(_) => StatusCode::FORBIDDEN,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Build the JSON body clients see
    pub fn body(&self) -> ErrorBody {
        use critic_core::Error as Core;

        let (operation, source, expose_details) = match self {
            Self::Core {
                operation,
                source,
                expose_details,
            } => (*operation, source, *expose_details),
            other => return ErrorBody::message(other.to_string()),
        };
        let details = |text: &str| expose_details.then(|| text.to_string());

        match source {
            Core::Validation(message) => ErrorBody::message(message.clone()),
            Core::NotFound(_) => ErrorBody::message("Report not found"),
            Core::Forbidden(_) => ErrorBody::message("Forbidden"),
            Core::SchemaMismatch {
                message,
                fix,
                sql,
                source_message,
            } => ErrorBody {
                error: message.clone(),
                details: details(source_message),
                fix: Some(fix.clone()),
                sql: Some(sql.clone()),
            },
            Core::Persistence(message) => ErrorBody {
                details: details(message),
                ..ErrorBody::message(operation.failure_message())
            },
            other => ErrorBody {
                details: details(&other.to_string()),
                ..ErrorBody::message("Internal server error")
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use critic_core::Error as Core;

    fn schema_mismatch() -> Core {
        Core::SchemaMismatch {
            message: "Database schema mismatch".into(),
            fix: "Run the SQL".into(),
            sql: "ALTER TABLE reviews ADD COLUMN user_id TEXT;".into(),
            source_message: "no such column: user_id".into(),
        }
    }

    #[test]
    fn test_error_status_codes() {
        let status = |e| ApiError::core(Operation::GetReport, e, false).status_code();

        assert_eq!(status(Core::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(Core::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(Core::Forbidden("x".into())), StatusCode::FORBIDDEN);
        assert_eq!(status(schema_mismatch()), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            status(Core::Persistence("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(Core::Upstream("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::PayloadTooLarge.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_operation_messages() {
        let body = |op| {
            ApiError::core(op, Core::Persistence("database is locked".into()), true).body()
        };

        assert_eq!(body(Operation::SubmitReview).error, "Failed to save review");
        assert_eq!(body(Operation::ListReports).error, "Failed to fetch reports");
        assert_eq!(body(Operation::GetReport).error, "Failed to fetch report");
        assert_eq!(
            body(Operation::GetReport).details.as_deref(),
            Some("database is locked")
        );
    }

    #[test]
    fn test_schema_mismatch_body() {
        let body = ApiError::core(Operation::SubmitReview, schema_mismatch(), true).body();

        assert_eq!(body.error, "Database schema mismatch");
        assert_eq!(body.fix.as_deref(), Some("Run the SQL"));
        assert!(body.sql.unwrap().contains("ADD COLUMN user_id"));
        assert_eq!(body.details.as_deref(), Some("no such column: user_id"));
    }

    #[test]
    fn test_details_hidden_in_production() {
        let body = ApiError::core(Operation::SubmitReview, schema_mismatch(), false).body();
        assert!(body.details.is_none());
        assert!(body.fix.is_some());

        let body = ApiError::core(
            Operation::SubmitReview,
            Core::Upstream("groq timed out".into()),
            false,
        )
        .body();
        assert_eq!(body, ErrorBody::message("Internal server error"));
    }

    #[test]
    fn test_client_errors_use_fixed_messages() {
        let body = |e| ApiError::core(Operation::GetReport, e, true).body();

        assert_eq!(body(Core::NotFound("missing".into())).error, "Report not found");
        assert_eq!(body(Core::Forbidden("alice".into())).error, "Forbidden");
        assert_eq!(
            body(Core::Validation("No file uploaded".into())),
            ErrorBody::message("No file uploaded")
        );
    }
}
