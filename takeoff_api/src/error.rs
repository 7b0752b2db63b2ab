//! Mapping from [`CalcError`] to HTTP responses.
//!
//! Every failure body has the same shape:
//!
//! ```json
//! { "error": { "code": "MISSING_FIELD", "field": "floors", "message": "...", "messageAr": "..." } }
//! ```

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use takeoff_core::errors::{CalcError, ErrorKind};
use tracing::{error, warn};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    Calc(CalcError),
    /// A blocking task panicked or was cancelled
    Internal(String),
}

impl From<CalcError> for ApiError {
    fn from(err: CalcError) -> Self {
        ApiError::Calc(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Calc(CalcError::invalid_input("body", "", rejection.body_text()))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
    pub message_ar: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Calc(err) => match err.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::Calc(err) => ErrorBody {
                code: err.error_code(),
                field: err.field().map(str::to_string),
                message: err.to_string(),
                message_ar: err.message_ar(),
            },
            ApiError::Internal(_) => ErrorBody {
                code: "INTERNAL_ERROR",
                field: None,
                message: "Internal server error".to_string(),
                message_ar: "حدث خطأ داخلي في الخادم".to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Calc(err) if status.is_client_error() => {
                warn!(code = err.error_code(), field = err.field(), "request rejected: {err}");
            }
            ApiError::Calc(err) => {
                error!(code = err.error_code(), recoverable = err.is_recoverable(), "request failed: {err}");
            }
            ApiError::Internal(reason) => {
                error!("internal error: {reason}");
            }
        }

        (status, Json(ErrorEnvelope { error: self.body() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(CalcError::missing_field("floors")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CalcError::report_not_found("x")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(CalcError::store_error("write", "/tmp/r.json", "disk full")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Internal("join".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_body_is_bilingual() {
        let body = ApiError::from(CalcError::missing_field("slabThickness")).body();
        assert_eq!(body.code, "MISSING_FIELD");
        assert_eq!(body.field.as_deref(), Some("slabThickness"));
        assert!(body.message.contains("slabThickness"));
        assert!(body.message_ar.contains("slabThickness"));

        let json = serde_json::to_value(ErrorEnvelope { error: body }).unwrap();
        assert!(json["error"].get("messageAr").is_some());
    }
}
