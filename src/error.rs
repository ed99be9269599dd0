//! Service error types with HTTP status code mapping.
//!
//! [`ServiceError`] is the central error type for request handling. Each
//! variant maps to a specific HTTP status code and structured JSON error
//! response. Port-level errors convert into it via `From`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::{ExtractionError, GeocodeError, RepositoryError};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid request: csvText is required",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category         | HTTP Status                   |
/// |-----------|------------------|-------------------------------|
/// | 1000–1999 | Validation       | 400 Bad Request               |
/// | 2000–2999 | Not Found        | 404 Not Found                 |
/// | 3000–3999 | Server           | 500 Internal Server Error     |
/// | 5000–5999 | Upstream service | 401 / 402 / 422 / 429 / 502   |
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No stored resource matched the request.
    #[error("not found: {0}")]
    NotFound(String),

    /// The upstream service rejected our credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The upstream service is throttling requests.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The upstream account has run out of credits.
    #[error("quota exhausted: {0}")]
    QuotaExhausted(String),

    /// Upstream output could not be turned into usable data.
    #[error("unprocessable: {0}")]
    Unprocessable(String),

    /// An upstream dependency is unreachable or failed.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::NotFound(_) => 2001,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::Unauthorized(_) => 5001,
            Self::QuotaExhausted(_) => 5002,
            Self::RateLimited(_) => 5003,
            Self::Unprocessable(_) => 5004,
            Self::UpstreamUnavailable(_) => 5005,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::QuotaExhausted(_) => StatusCode::PAYMENT_REQUIRED,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl From<GeocodeError> for ServiceError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::InvalidRequest { message } => Self::InvalidRequest(message),
            GeocodeError::RateLimited { message } => Self::RateLimited(message),
            other => Self::UpstreamUnavailable(other.to_string()),
        }
    }
}

impl From<ExtractionError> for ServiceError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::Unauthorized { message } => Self::Unauthorized(message),
            ExtractionError::RateLimited { message } => Self::RateLimited(message),
            ExtractionError::QuotaExhausted { message } => Self::QuotaExhausted(message),
            ExtractionError::Unparseable { message } => Self::Unprocessable(message),
            ExtractionError::Transport { message } | ExtractionError::Upstream { message } => {
                Self::Internal(message)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
