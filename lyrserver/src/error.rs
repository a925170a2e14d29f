//! HTTP error responses
//!
//! Hard failures map to 4xx/5xx with the uniform envelope; duplicate
//! requests are NOT an [`ApiError`], they answer 200 with a soft error
//! envelope (see the ask handler).

use crate::dto::{ApiResponse, ValidationKind};
use crate::messages::{self, codes};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lyrchat::Language;
use tracing::warn;

/// An error that terminates request handling
#[derive(Debug)]
pub struct ApiError {
    pub code: &'static str,
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn validation(kind: ValidationKind, lang: Language) -> Self {
        Self {
            code: codes::VALIDATION_ERROR,
            status: StatusCode::BAD_REQUEST,
            message: messages::validation_message(kind, lang).to_string(),
        }
    }

    pub fn service_unavailable(lang: Language) -> Self {
        Self {
            code: codes::AI_SERVICE_UNAVAILABLE,
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: messages::error_message(codes::AI_SERVICE_UNAVAILABLE, lang).to_string(),
        }
    }

    pub fn no_response(lang: Language) -> Self {
        Self {
            code: codes::AI_NO_RESPONSE,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: messages::error_message(codes::AI_NO_RESPONSE, lang).to_string(),
        }
    }

    pub fn unknown(lang: Language) -> Self {
        Self {
            code: codes::UNKNOWN_ERROR,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: messages::error_message(codes::UNKNOWN_ERROR, lang).to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(code = self.code, status = %self.status, "Request failed: {}", self.message);
        (self.status, Json(ApiResponse::<()>::error(self.message))).into_response()
    }
}
