//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Validation failures keep their own status (400/415) and machine-readable
//! code (`E_BAD_PARAM`/`E_BAD_CONTENT_TYPE`); body-handling failures get
//! codes of their own. Every error renders as the same JSON envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use paramcheck_core::ValidationError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "E_BAD_PARAM").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// The offending field, present only for parameter errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A parameter or content-type rejection (400/415).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The body could not be read or decoded (400).
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// The body exceeded the configured limit (413).
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// No route is declared for the request (404).
    #[error("not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(err) => (
                StatusCode::from_u16(err.status()).unwrap_or(StatusCode::BAD_REQUEST),
                err.code().as_str(),
            ),
            Self::MalformedBody(_) => (StatusCode::BAD_REQUEST, "E_BAD_BODY"),
            Self::PayloadTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "E_PAYLOAD_TOO_LARGE"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "E_NOT_FOUND"),
        }
    }

    fn key(&self) -> Option<String> {
        match self {
            Self::Validation(err) => err.key().map(str::to_string),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                key: self.key(),
            },
        };

        (status, Json(body)).into_response()
    }
}
