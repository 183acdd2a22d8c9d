
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::ValidationErrors;
use common::storage::StorageError;
use listing::{StoreError, SubmissionError, UploadError};
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `TOKEN_INVALID`,
    /// `LOGIN_REQUIRED`, `NOT_FOUND`, `CONFLICT`, `UNSUPPORTED_MEDIA_TYPE`,
    /// `PAYLOAD_TOO_LARGE`, `UPLOAD_FAILED`, `SAVE_FAILED`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Some fields are invalid")]
    pub message: String,
    /// Per-field messages for `VALIDATION_ERROR` responses on the product form.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<BTreeMap<String, String>>, example = json!({"name": "Name is required"}))]
    pub fields: Option<ValidationErrors>,
    /// Where the client should navigate next, if anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "/login")]
    pub redirect: Option<&'static str>,
}

impl ErrorBody {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            fields: None,
            redirect: None,
        }
    }
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    InvalidFields(ValidationErrors),
    TokenInvalid,
    /// No signed-in user; the client is sent to the given route.
    LoginRequired(&'static str),
    NotFound(String),
    Conflict(String),
    UnsupportedMediaType(String),
    PayloadTooLarge { limit: u64 },
    UploadFailed(String),
    /// Saving failed; the message is safe to show to the user.
    SaveFailed(&'static str),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("VALIDATION_ERROR", msg),
            ),
            AppError::InvalidFields(fields) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    fields: Some(fields),
                    ..ErrorBody::new("VALIDATION_ERROR", "Some fields are invalid")
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new("TOKEN_INVALID", "Invalid or expired token"),
            ),
            AppError::LoginRequired(redirect) => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    redirect: Some(redirect),
                    ..ErrorBody::new("LOGIN_REQUIRED", "Sign in to create a product")
                },
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorBody::new("NOT_FOUND", msg)),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorBody::new("CONFLICT", msg)),
            AppError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ErrorBody::new("UNSUPPORTED_MEDIA_TYPE", msg),
            ),
            AppError::PayloadTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody::new(
                    "PAYLOAD_TOO_LARGE",
                    format!("File exceeds maximum size of {limit} bytes"),
                ),
            ),
            AppError::UploadFailed(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorBody::new("UPLOAD_FAILED", msg),
            ),
            AppError::SaveFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new("SAVE_FAILED", msg),
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("INTERNAL_ERROR", "An unexpected error occurred"),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(path) => AppError::NotFound(format!("Object '{path}' not found")),
            StorageError::InvalidName(msg) => AppError::Validation(format!("Invalid name: {msg}")),
            StorageError::SizeLimitExceeded { limit, .. } => AppError::PayloadTooLarge { limit },
            StorageError::Io(e) => AppError::Internal(format!("Storage IO error: {e}")),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Resolution(e) => AppError::from(e),
            other => AppError::UploadFailed(other.to_string()),
        }
    }
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::AlreadySubmitting => AppError::Conflict(err.user_message().into()),
            SubmissionError::ImagePending => AppError::Validation(err.user_message().into()),
            SubmissionError::Persistence(ref e) => {
                tracing::error!(error = %e, "Product could not be saved");
                AppError::SaveFailed(err.user_message())
            }
        }
    }
}
