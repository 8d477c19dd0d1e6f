use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::{
    clock::IdGenerator,
    providers::{
        AuthorizeParams, CaptureParams, PaymentProvider, ProviderCapabilities, ProviderError,
        ProviderOperation, ProviderResult, RefundParams, ensure_positive_amount,
    },
    value_objects::{payment_methods::UPI_METHOD_ID, payment_results::PaymentResult},
};

const PROVIDER_NAME: &str = "upi";
const EXTERNAL_ID_PREFIX: &str = "upi_";

/// Collect requests against a customer VPA, credited to the merchant VPA.
pub struct UpiProvider {
    merchant_vpa: String,
    ids: Arc<dyn IdGenerator>,
}

impl UpiProvider {
    pub fn new(merchant_vpa: String, ids: Arc<dyn IdGenerator>) -> Self {
        Self { merchant_vpa, ids }
    }

    fn ensure_own_reference(external_id: &str) -> Result<(), ProviderError> {
        if !external_id.starts_with(EXTERNAL_ID_PREFIX) {
            return Err(ProviderError::Declined(format!(
                "{external_id} is not a UPI payment"
            )));
        }
        Ok(())
    }
}

/// Accepts `handle@psp` where both sides use letters, digits, `_`, `.` or `-`.
pub fn is_valid_vpa(vpa: &str) -> bool {
    let Some((handle, provider)) = vpa.split_once('@') else {
        return false;
    };
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-');
    !handle.is_empty()
        && !provider.is_empty()
        && handle.chars().all(allowed)
        && provider.chars().all(allowed)
}

#[async_trait]
impl PaymentProvider for UpiProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn supports(&self, method_id: &str) -> bool {
        method_id == UPI_METHOD_ID
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            capture: true,
            refund: true,
            defers_settlement: false,
        }
    }

    async fn authorize(&self, params: AuthorizeParams) -> ProviderResult {
        // The VPA is checked exactly as sent; surrounding whitespace is invalid.
        let vpa = match params.fields.get("vpa") {
            Some(Value::String(vpa)) if is_valid_vpa(vpa) => vpa.clone(),
            None | Some(Value::Null) => {
                return Ok(PaymentResult::failed("UPI ID (VPA) is required"));
            }
            Some(Value::String(vpa)) if vpa.trim().is_empty() => {
                return Ok(PaymentResult::failed("UPI ID (VPA) is required"));
            }
            Some(_) => {
                warn!(order_id = %params.order_id, "payments: upi vpa rejected");
                return Ok(PaymentResult::failed("Invalid UPI ID (VPA) format"));
            }
        };
        ensure_positive_amount(params.amount)?;

        let external_id = format!("{EXTERNAL_ID_PREFIX}{}", self.ids.next_id().simple());
        info!(
            order_id = %params.order_id,
            %external_id,
            payer = %vpa,
            payee = %self.merchant_vpa,
            amount = params.amount,
            "payments: upi collect request authorized"
        );
        Ok(PaymentResult::authorized(external_id))
    }

    async fn capture(&self, params: CaptureParams) -> ProviderResult {
        ensure_positive_amount(params.amount)?;
        Self::ensure_own_reference(&params.external_id)?;

        debug!(external_id = %params.external_id, amount = params.amount, "payments: upi capture");
        Ok(PaymentResult::captured(params.external_id, None))
    }

    async fn refund(&self, params: RefundParams) -> ProviderResult {
        ensure_positive_amount(params.amount)?;
        Self::ensure_own_reference(&params.external_id)?;

        debug!(external_id = %params.external_id, amount = params.amount, "payments: upi refund");
        Ok(PaymentResult::refunded(params.external_id))
    }

    async fn mark_pending(&self, _params: AuthorizeParams) -> ProviderResult {
        Err(ProviderError::unsupported(
            PROVIDER_NAME,
            ProviderOperation::MarkPending,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        clock::SequentialIdGenerator, value_objects::enums::payment_statuses::PaymentStatus,
    };
    use serde_json::json;

    fn provider() -> UpiProvider {
        UpiProvider::new("grocer@upi".to_string(), Arc::new(SequentialIdGenerator::new()))
    }

    fn params_with_vpa(vpa: &str) -> AuthorizeParams {
        AuthorizeParams {
            amount: 100,
            currency: "USD".to_string(),
            fields: json!({ "vpa": vpa }).as_object().cloned().unwrap(),
            order_id: "o1".to_string(),
            customer_id: None,
        }
    }

    #[test]
    fn vpa_format() {
        for valid in ["user@bank", "first.last-1@ok_axis", "a@b"] {
            assert!(is_valid_vpa(valid), "{valid} should be valid");
        }
        for invalid in ["userbank", "@bank", "user@", "user@@bank", "us er@bank", "user@bank!"] {
            assert!(!is_valid_vpa(invalid), "{invalid} should be invalid");
        }
    }

    #[tokio::test]
    async fn valid_vpa_is_authorized_with_upi_reference() {
        let result = provider().authorize(params_with_vpa("user@bank")).await.unwrap();

        assert_eq!(result.status(), PaymentStatus::Authorized);
        assert!(result.external_id().unwrap().starts_with("upi_"));
    }

    #[tokio::test]
    async fn invalid_vpa_yields_failed_result() {
        for vpa in ["not-a-vpa", "user@bank@x", " user@bank", "user@bank "] {
            let result = provider().authorize(params_with_vpa(vpa)).await.unwrap();
            assert_eq!(result.status(), PaymentStatus::Failed, "{vpa:?} should fail");
            assert_eq!(result.error(), Some("Invalid UPI ID (VPA) format"));
        }
    }

    #[tokio::test]
    async fn missing_or_blank_vpa_is_required() {
        let mut missing = params_with_vpa("user@bank");
        missing.fields.remove("vpa");

        for params in [missing, params_with_vpa(""), params_with_vpa("   ")] {
            let result = provider().authorize(params).await.unwrap();
            assert_eq!(result.status(), PaymentStatus::Failed);
            assert_eq!(result.error(), Some("UPI ID (VPA) is required"));
        }
    }

    #[tokio::test]
    async fn capture_keeps_reference() {
        let result = provider()
            .capture(CaptureParams {
                external_id: "upi_1".to_string(),
                amount: 100,
                currency: "USD".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(result.status(), PaymentStatus::Captured);
        assert_eq!(result.external_id(), Some("upi_1"));
    }

    #[tokio::test]
    async fn non_positive_amount_is_declined() {
        let mut params = params_with_vpa("user@bank");
        params.amount = 0;

        let err = provider().authorize(params).await.unwrap_err();

        assert!(matches!(err, ProviderError::Declined(_)));
    }
}
