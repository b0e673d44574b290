use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Uniform wrapper around every JSON response.
///
/// `message` accompanies a successful response, `error` a failed one. Absent
/// fields are left out of the serialized body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`.
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Successful response without a payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
            data: None,
        }
    }

    /// Failed response.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            data: None,
        }
    }
}

/// Envelope without a payload, as documented in the OpenAPI schema.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// Whether the operation succeeded
    success: bool,
    /// Human-readable outcome on success
    message: Option<String>,
    /// Error description on failure
    error: Option<String>,
}

/// Errors a handler can answer with. Each renders as a failed envelope.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body is missing, not JSON, or does not match the expected shape.
    #[error("Invalid input")]
    InvalidInput,
    /// The `{id}` path segment is not a positive integer.
    #[error("Invalid ID")]
    InvalidId,
    /// At least one requested department does not exist.
    #[error("Invalid department IDs")]
    InvalidDepartmentIds,
    /// The referenced user does not exist.
    #[error("Invalid user ID")]
    InvalidUserId,
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The store rejected the operation; its error text is passed through.
    #[error("{0}")]
    Store(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput
            | ApiError::InvalidId
            | ApiError::InvalidDepartmentIds
            | ApiError::InvalidUserId => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection);
        ApiError::InvalidInput
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Store(err) = &self {
            tracing::error!("Store operation failed: {}", err);
        }
        (
            self.status_code(),
            Json(ApiResponse::failure(self.to_string())),
        )
            .into_response()
    }
}
