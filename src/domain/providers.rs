//! Contract every payment provider adapter implements.
//!
//! Providers only translate a request into a [`PaymentResult`]; they never
//! touch persistence and never read the clock. Operations a provider cannot
//! perform return [`ProviderError::UnsupportedOperation`] instead of a no-op.

use std::fmt::Display;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::value_objects::{payment_results::PaymentResult, payments::PaymentFields};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderOperation {
    Authorize,
    Capture,
    Refund,
    MarkPending,
}

impl ProviderOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderOperation::Authorize => "authorize",
            ProviderOperation::Capture => "capture",
            ProviderOperation::Refund => "refund",
            ProviderOperation::MarkPending => "mark_pending",
        }
    }
}

impl Display for ProviderOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("unsupported operation: {provider} does not support {operation}")]
    UnsupportedOperation {
        provider: &'static str,
        operation: ProviderOperation,
    },
    /// Business-level refusal (bad card, insufficient funds, ...).
    #[error("payment declined: {0}")]
    Declined(String),
    /// The provider could not be reached or answered with an error.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    pub fn unsupported(provider: &'static str, operation: ProviderOperation) -> Self {
        ProviderError::UnsupportedOperation {
            provider,
            operation,
        }
    }
}

pub type ProviderResult = std::result::Result<PaymentResult, ProviderError>;

/// Static description of what a provider can do, read once when the provider
/// table is composed and again by the use-cases to pick a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderCapabilities {
    pub capture: bool,
    pub refund: bool,
    /// Settlement happens outside the provider (cash on delivery), so a new
    /// payment is marked pending instead of authorized.
    pub defers_settlement: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizeParams {
    pub amount: i64,
    pub currency: String,
    pub fields: PaymentFields,
    pub order_id: String,
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureParams {
    pub external_id: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundParams {
    pub external_id: String,
    pub amount: i64,
    pub currency: String,
    pub reason: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn supports(&self, method_id: &str) -> bool;

    fn capabilities(&self) -> ProviderCapabilities;

    async fn authorize(&self, params: AuthorizeParams) -> ProviderResult;

    async fn capture(&self, params: CaptureParams) -> ProviderResult;

    async fn refund(&self, params: RefundParams) -> ProviderResult;

    async fn mark_pending(&self, params: AuthorizeParams) -> ProviderResult;
}

/// Shared guard for every provider entry point.
pub fn ensure_positive_amount(amount: i64) -> std::result::Result<(), ProviderError> {
    if amount <= 0 {
        return Err(ProviderError::Declined(
            "Amount must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
