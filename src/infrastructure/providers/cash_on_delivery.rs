use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::{
    clock::IdGenerator,
    providers::{
        AuthorizeParams, CaptureParams, PaymentProvider, ProviderCapabilities, ProviderError,
        ProviderOperation, ProviderResult, RefundParams,
    },
    value_objects::{payment_methods::CASH_ON_DELIVERY_METHOD_ID, payment_results::PaymentResult},
};

const PROVIDER_NAME: &str = "cash_on_delivery";
const SUPPORTED_METHODS: [&str; 2] = [CASH_ON_DELIVERY_METHOD_ID, "cod"];
const EXTERNAL_ID_PREFIX: &str = "cod_";

/// Cash collected by the delivery rider. Nothing settles through this adapter,
/// so every new payment stays pending and capture/refund are not available.
pub struct CashOnDeliveryProvider {
    ids: Arc<dyn IdGenerator>,
}

impl CashOnDeliveryProvider {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    fn pending(&self, params: &AuthorizeParams) -> ProviderResult {
        let external_id = format!("{EXTERNAL_ID_PREFIX}{}", self.ids.next_id().simple());
        info!(
            order_id = %params.order_id,
            %external_id,
            amount = params.amount,
            "payments: cash on delivery payment pending"
        );
        Ok(PaymentResult::pending(external_id))
    }
}

#[async_trait]
impl PaymentProvider for CashOnDeliveryProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn supports(&self, method_id: &str) -> bool {
        SUPPORTED_METHODS.contains(&method_id)
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            capture: false,
            refund: false,
            defers_settlement: true,
        }
    }

    async fn authorize(&self, params: AuthorizeParams) -> ProviderResult {
        self.pending(&params)
    }

    async fn capture(&self, _params: CaptureParams) -> ProviderResult {
        Err(ProviderError::unsupported(
            PROVIDER_NAME,
            ProviderOperation::Capture,
        ))
    }

    async fn refund(&self, _params: RefundParams) -> ProviderResult {
        Err(ProviderError::unsupported(
            PROVIDER_NAME,
            ProviderOperation::Refund,
        ))
    }

    async fn mark_pending(&self, params: AuthorizeParams) -> ProviderResult {
        self.pending(&params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        clock::SequentialIdGenerator,
        value_objects::{enums::payment_statuses::PaymentStatus, payments::PaymentFields},
    };

    fn provider() -> CashOnDeliveryProvider {
        CashOnDeliveryProvider::new(Arc::new(SequentialIdGenerator::new()))
    }

    fn params() -> AuthorizeParams {
        AuthorizeParams {
            amount: 50,
            currency: "USD".to_string(),
            fields: PaymentFields::new(),
            order_id: "o2".to_string(),
            customer_id: None,
        }
    }

    #[tokio::test]
    async fn authorize_and_mark_pending_are_always_pending() {
        let provider = provider();

        let authorized = provider.authorize(params()).await.unwrap();
        let marked = provider.mark_pending(params()).await.unwrap();

        for result in [&authorized, &marked] {
            assert_eq!(result.status(), PaymentStatus::Pending);
            assert!(result.external_id().unwrap().starts_with("cod_"));
        }
        assert_ne!(authorized.external_id(), marked.external_id());
    }

    #[tokio::test]
    async fn zero_amount_is_still_pending() {
        let provider = provider();
        let mut zero = params();
        zero.amount = 0;

        for result in [
            provider.authorize(zero.clone()).await.unwrap(),
            provider.mark_pending(zero).await.unwrap(),
        ] {
            assert_eq!(result.status(), PaymentStatus::Pending);
            assert!(result.external_id().unwrap().starts_with("cod_"));
        }
    }

    #[tokio::test]
    async fn capture_and_refund_are_unsupported() {
        let provider = provider();

        let capture = provider
            .capture(CaptureParams {
                external_id: "cod_1".to_string(),
                amount: 50,
                currency: "USD".to_string(),
            })
            .await
            .unwrap_err();
        let refund = provider
            .refund(RefundParams {
                external_id: "cod_1".to_string(),
                amount: 50,
                currency: "USD".to_string(),
                reason: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            capture,
            ProviderError::UnsupportedOperation {
                operation: ProviderOperation::Capture,
                ..
            }
        ));
        assert!(matches!(
            refund,
            ProviderError::UnsupportedOperation {
                operation: ProviderOperation::Refund,
                ..
            }
        ));
    }

    #[test]
    fn supports_both_method_aliases() {
        let provider = provider();

        assert!(provider.supports("cash_on_delivery"));
        assert!(provider.supports("cod"));
        assert!(!provider.supports("upi"));
        assert!(provider.capabilities().defers_settlement);
    }
}
