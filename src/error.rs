//! Marketplace error types with HTTP status code mapping.
//!
//! [`MarketError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Two deliberate policies live here:
//!
//! - Ownership failures are reported as [`MarketError::NotFound`] so a
//!   caller cannot distinguish "does not exist" from "belongs to someone
//!   else".
//! - Store and internal failures are logged with their detail but
//!   serialized with a generic message; the detail never reaches the
//!   client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid request: offering must not be empty",
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
    /// Numeric error code (see code ranges on [`MarketError`]).
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
/// | Range     | Category             | HTTP Status               |
/// |-----------|----------------------|---------------------------|
/// | 1000–1999 | Validation           | 400 Bad Request           |
/// | 2000–2999 | Not Found            | 404 Not Found             |
/// | 3000–3999 | Server               | 500 Internal Server Error |
/// | 4000–4999 | Content / Moderation | 422 Unprocessable Entity  |
/// | 401 / 429 | Auth / Quota         | 401 / 429                 |
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// Request validation failed (missing or malformed field).
    #[error("invalid request: {0}")]
    Validation(String),

    /// Unsupported or invalid game string.
    #[error("unsupported game: {0}")]
    UnsupportedGame(String),

    /// No session or an expired session was presented.
    #[error("authentication required")]
    Unauthenticated,

    /// The named resource does not exist, or is not owned by the actor.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The actor already holds the maximum number of active listings.
    #[error("active listing limit of {limit} reached; delete one first")]
    QuotaExceeded {
        /// The configured active-listing limit.
        limit: u32,
    },

    /// Free text was rejected by the moderation filter. The reason is
    /// generic and never names the matched term.
    #[error("{0}")]
    ModerationRejected(String),

    /// Persistence layer failure. Detail is logged, never serialized.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Internal server error. Detail is logged, never serialized.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MarketError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::UnsupportedGame(_) => 1002,
            Self::Unauthenticated => 401,
            Self::NotFound(_) => 2001,
            Self::QuotaExceeded { .. } => 429,
            Self::ModerationRejected(_) => 4001,
            Self::Persistence(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::UnsupportedGame(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::ModerationRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the message that is safe to serialize to the client.
    ///
    /// Server-side variants collapse to a generic message; everything
    /// else uses the `Display` form.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Persistence(_) | Self::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.client_message(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = MarketError::Validation("offering must not be empty".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1001);
    }

    #[test]
    fn quota_message_names_the_limit() {
        let err = MarketError::QuotaExceeded { limit: 3 };
        assert!(err.to_string().contains('3'));
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn server_errors_serialize_generically() {
        let err = MarketError::Persistence("connection refused to db:5432".to_string());
        assert_eq!(err.client_message(), "internal server error");
        assert!(!err.client_message().contains("5432"));
    }

    #[test]
    fn not_found_does_not_mention_ownership() {
        let err = MarketError::NotFound("listing");
        assert_eq!(err.to_string(), "listing not found");
    }
}
