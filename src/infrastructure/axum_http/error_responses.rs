use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::application::usecases::payment_errors::PaymentError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

impl ErrorResponse {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }
}

pub fn error_code(err: &PaymentError) -> &'static str {
    match err {
        PaymentError::Validation(_) => "VALIDATION_ERROR",
        PaymentError::NotFound(_) => "NOT_FOUND",
        PaymentError::UnsupportedOperation { .. } => "UNSUPPORTED_OPERATION",
        PaymentError::Configuration(_) => "CONFIGURATION_ERROR",
        PaymentError::Provider(_) => "PROVIDER_ERROR",
        PaymentError::Conflict(_) => "CONFLICT",
        PaymentError::Internal(_) => "INTERNAL_ERROR",
    }
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = error_code(&self);
        let message = match &self {
            PaymentError::Internal(err) => {
                error!(error = ?err, "payments: internal error");
                // Don't leak internal error detail to client
                "Internal server error".to_string()
            }
            other => {
                if status.is_server_error() {
                    error!(error = %other, code, "payments: request failed");
                }
                other.to_string()
            }
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

pub fn success<T: Serialize>(data: T) -> Response {
    (
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            data,
            count: None,
        }),
    )
        .into_response()
}

pub fn success_with_count<T: Serialize>(data: T, count: usize) -> Response {
    (
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            data,
            count: Some(count),
        }),
    )
        .into_response()
}
