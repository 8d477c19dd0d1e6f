use serde::Serialize;

use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;

/// Uniform outcome of a provider operation.
///
/// Fields are private so a result cannot be altered once a provider or
/// use-case has produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    status: PaymentStatus,
    external_id: Option<String>,
    receipt_url: Option<String>,
    error: Option<String>,
}

impl PaymentResult {
    pub fn authorized(external_id: impl Into<String>) -> Self {
        Self {
            status: PaymentStatus::Authorized,
            external_id: Some(external_id.into()),
            receipt_url: None,
            error: None,
        }
    }

    pub fn pending(external_id: impl Into<String>) -> Self {
        Self {
            status: PaymentStatus::Pending,
            external_id: Some(external_id.into()),
            receipt_url: None,
            error: None,
        }
    }

    pub fn captured(external_id: impl Into<String>, receipt_url: Option<String>) -> Self {
        Self {
            status: PaymentStatus::Captured,
            external_id: Some(external_id.into()),
            receipt_url,
            error: None,
        }
    }

    pub fn refunded(external_id: impl Into<String>) -> Self {
        Self {
            status: PaymentStatus::Refunded,
            external_id: Some(external_id.into()),
            receipt_url: None,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: PaymentStatus::Failed,
            external_id: None,
            receipt_url: None,
            error: Some(error.into()),
        }
    }

    /// A failure that still belongs to a known provider reference, e.g. a
    /// declined capture of an existing authorization.
    pub fn failed_for(external_id: Option<String>, error: impl Into<String>) -> Self {
        Self {
            external_id,
            ..Self::failed(error)
        }
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    pub fn receipt_url(&self) -> Option<&str> {
        self.receipt_url.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_failed(&self) -> bool {
        self.status == PaymentStatus::Failed
    }
}
