use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::{
    providers::ProviderOperation, repositories::payment_intents::StaleIntentVersion,
};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("unsupported operation: {provider} does not support {operation}")]
    UnsupportedOperation {
        provider: &'static str,
        operation: ProviderOperation,
    },
    #[error("{0}")]
    Configuration(String),
    #[error("payment provider error: {0}")]
    Provider(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::Validation(_) => StatusCode::BAD_REQUEST,
            PaymentError::NotFound(_) => StatusCode::NOT_FOUND,
            PaymentError::UnsupportedOperation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PaymentError::Conflict(_) => StatusCode::CONFLICT,
            PaymentError::Provider(_) => StatusCode::BAD_GATEWAY,
            PaymentError::Configuration(_) | PaymentError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Maps a repository write failure, surfacing lost optimistic-lock races as conflicts.
    pub(crate) fn from_update(err: anyhow::Error) -> Self {
        match err.downcast_ref::<StaleIntentVersion>() {
            Some(stale) => PaymentError::Conflict(format!(
                "Payment intent {} was updated by another request; retry with fresh state",
                stale.intent_id
            )),
            None => PaymentError::Internal(err),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn status_codes_follow_the_error_kind() {
        assert_eq!(
            PaymentError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PaymentError::NotFound("missing".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PaymentError::UnsupportedOperation {
                provider: "cash_on_delivery",
                operation: ProviderOperation::Capture,
            }
            .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            PaymentError::Provider("timeout".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn stale_version_becomes_conflict() {
        let err = anyhow::Error::new(StaleIntentVersion {
            intent_id: Uuid::from_u128(1),
            expected: 1,
            actual: 2,
        });

        assert!(matches!(PaymentError::from_update(err), PaymentError::Conflict(_)));
        assert!(matches!(
            PaymentError::from_update(anyhow::anyhow!("disk full")),
            PaymentError::Internal(_)
        ));
    }
}
