//! API error types with structured JSON responses.
//!
//! User-facing messages are Spanish, matching the rest of the application
//! output; codes are stable machine-readable identifiers for the SPA.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core_state::CoreError;
use crate::gemini::GeminiError;
use crate::pipeline::{
    AnalysisError, EMPTY_EXTRACTION_MESSAGE, GENERIC_FAILURE_MESSAGE, SERVICE_BUSY_MESSAGE,
};

/// Seconds the client should wait before retrying an overloaded service.
const BUSY_RETRY_AFTER_SECS: u64 = 30;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Input-validation failure. Message is already user-facing Spanish.
    #[error("Invalid request: {0}")]
    BadRequest(String),
    /// A submission arrived while another analysis is loading.
    #[error("Analysis already in flight")]
    AnalysisInFlight,
    /// No successful report exists yet.
    #[error("No report available")]
    NoReport,
    /// The model service is rate-limiting or overloaded; retry later.
    #[error("Generative service busy")]
    ServiceBusy,
    /// Extraction found nothing usable in the document.
    #[error("No analytes extracted")]
    NoAnalytes,
    /// Any other pipeline failure; detail is logged, not exposed.
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::AnalysisInFlight => (
                StatusCode::CONFLICT,
                "ANALYSIS_IN_FLIGHT",
                "Ya hay un análisis en curso. Espera a que termine.".to_string(),
            ),
            ApiError::NoReport => (
                StatusCode::NOT_FOUND,
                "NO_REPORT",
                "Aún no hay un informe analizado.".to_string(),
            ),
            ApiError::ServiceBusy => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_BUSY",
                SERVICE_BUSY_MESSAGE.to_string(),
            ),
            ApiError::NoAnalytes => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NO_ANALYTES",
                EMPTY_EXTRACTION_MESSAGE.to_string(),
            ),
            ApiError::AnalysisFailed(detail) => {
                tracing::error!(detail, "Analysis pipeline failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "ANALYSIS_FAILED",
                    GENERIC_FAILURE_MESSAGE.to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Ocurrió un error interno.".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        let mut response = (status, Json(body)).into_response();
        if matches!(self, ApiError::ServiceBusy) {
            if let Ok(val) = axum::http::HeaderValue::from_str(&BUSY_RETRY_AFTER_SECS.to_string())
            {
                response.headers_mut().insert("Retry-After", val);
            }
        }
        response
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InvalidInput(msg) => ApiError::BadRequest(msg),
            AnalysisError::EmptyExtraction => ApiError::NoAnalytes,
            AnalysisError::Gemini(GeminiError::Overloaded { .. }) => ApiError::ServiceBusy,
            other => ApiError::AnalysisFailed(other.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AnalysisInFlight => ApiError::AnalysisInFlight,
            CoreError::LockPoisoned => ApiError::Internal("lock poisoned".into()),
        }
    }
}
