use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use wattcompare_core::ApplianceError;
use wattcompare_ocr::{OcrError, PipelineError};
use wattcompare_pdf::ReportError;

/// Errors returned from handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("OCR engine unavailable: {0}")]
    OcrUnavailable(String),

    #[error("OCR timed out: {0}")]
    OcrTimeout(String),

    #[error("OCR engine failed: {0}")]
    OcrEngine(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::OcrUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::OcrTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::OcrEngine(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::NotFound(_) => "NotFound",
            ApiError::OcrUnavailable(_) => "OcrUnavailable",
            ApiError::OcrTimeout(_) => "OcrTimeout",
            ApiError::OcrEngine(_) => "OcrEngineError",
            ApiError::Internal(_) => "InternalServerError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            ApiError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                "An internal error occurred".to_string()
            }
            ApiError::OcrUnavailable(_) | ApiError::OcrTimeout(_) | ApiError::OcrEngine(_) => {
                tracing::warn!(error = %self, "OCR failure");
                self.to_string()
            }
            _ => {
                tracing::debug!(error = %self, "client error");
                self.to_string()
            }
        };

        let body = ErrorResponse {
            error: self.error_type(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

// Conversions from library errors

impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        ApiError::Internal(format!("database error: {error}"))
    }
}

impl From<ApplianceError> for ApiError {
    fn from(error: ApplianceError) -> Self {
        ApiError::BadRequest(error.to_string())
    }
}

impl From<PipelineError> for ApiError {
    fn from(error: PipelineError) -> Self {
        match error {
            PipelineError::Ocr(OcrError::Timeout(limit)) => {
                ApiError::OcrTimeout(format!("no result after {limit:?}"))
            }
            PipelineError::Ocr(OcrError::NotAvailable(msg)) => ApiError::OcrUnavailable(msg),
            PipelineError::Ocr(e @ (OcrError::Engine(_) | OcrError::ImageDecode(_))) => {
                ApiError::OcrEngine(e.to_string())
            }
            PipelineError::Preprocess(e) => ApiError::Internal(e.to_string()),
            PipelineError::Join(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(error: ReportError) -> Self {
        ApiError::Internal(error.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(error: tokio::task::JoinError) -> Self {
        ApiError::Internal(error.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        ApiError::BadRequest(error.body_text())
    }
}
