use std::{sync::Arc, time::Duration};

use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    application::usecases::{
        capture_payment::{ensure_owned_by, provider_reference, validate_settlement},
        intent_claims::{claim_intent, release_intent},
        payment_errors::{PaymentError, UseCaseResult},
        provider_calls::call_provider,
    },
    domain::{
        clock::Clock,
        entities::payment_intents::PaymentIntentEntity,
        providers::{PaymentProvider, ProviderOperation, RefundParams},
        repositories::payment_intents::PaymentIntentRepository,
        value_objects::payments::{PaymentOutcome, RefundPaymentModel},
    },
};

const REFUND_REASON_KEY: &str = "refundReason";

pub struct RefundPaymentUseCase<R>
where
    R: PaymentIntentRepository + Send + Sync + 'static,
{
    provider: Arc<dyn PaymentProvider>,
    payment_intent_repo: Arc<R>,
    clock: Arc<dyn Clock>,
    provider_timeout: Duration,
}

impl<R> RefundPaymentUseCase<R>
where
    R: PaymentIntentRepository + Send + Sync + 'static,
{
    pub fn new(
        provider: Arc<dyn PaymentProvider>,
        payment_intent_repo: Arc<R>,
        clock: Arc<dyn Clock>,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            payment_intent_repo,
            clock,
            provider_timeout,
        }
    }

    pub async fn execute(&self, model: RefundPaymentModel) -> UseCaseResult<PaymentOutcome> {
        info!(payment_id = %model.payment_id, amount = model.amount, "payments: refund request received");
        let intent = resolve_payment(self.payment_intent_repo.as_ref(), &model.payment_id).await?;

        ensure_owned_by(self.provider.as_ref(), &intent)?;
        if !intent.status.is_refundable() {
            return Err(PaymentError::Validation(format!(
                "Payment intent {} cannot be refunded while {}",
                intent.id, intent.status
            )));
        }
        validate_settlement(&intent, model.amount, model.currency.as_deref())?;
        let external_id = provider_reference(&intent)?;
        if !self.provider.capabilities().refund {
            return Err(PaymentError::UnsupportedOperation {
                provider: self.provider.name(),
                operation: ProviderOperation::Refund,
            });
        }

        let repository = self.payment_intent_repo.as_ref();
        let mut intent = claim_intent(repository, intent).await?;
        let called = call_provider(
            self.provider.name(),
            ProviderOperation::Refund,
            self.provider_timeout,
            Some(external_id.clone()),
            self.provider.refund(RefundParams {
                external_id,
                amount: model.amount,
                currency: intent.currency.clone(),
                reason: model.reason.clone(),
            }),
        )
        .await;
        let result = match called {
            Ok(result) => result,
            Err(err) => {
                release_intent(repository, intent).await;
                return Err(err);
            }
        };

        if !result.is_failed() {
            if let Some(reason) = model.reason.filter(|reason| !reason.trim().is_empty()) {
                intent
                    .metadata
                    .insert(REFUND_REASON_KEY.to_string(), Value::String(reason));
            }
        }
        intent.apply_result(&result, self.clock.now());
        let intent = repository
            .update(intent)
            .await
            .map_err(PaymentError::from_update)?;

        info!(
            intent_id = %intent.id,
            status = %intent.status,
            version = intent.version,
            "payments: refund finished"
        );
        Ok(PaymentOutcome {
            intent_id: intent.id,
            result,
        })
    }
}

/// Looks a payment up by provider reference first, then by intent id.
pub async fn resolve_payment<R>(repository: &R, payment_id: &str) -> UseCaseResult<PaymentIntentEntity>
where
    R: PaymentIntentRepository + ?Sized,
{
    let payment_id = payment_id.trim();
    let db_error = |err: anyhow::Error| {
        error!(%payment_id, db_error = ?err, "payments: failed to resolve payment");
        PaymentError::Internal(err)
    };

    if let Some(intent) = repository
        .find_by_external_id(payment_id)
        .await
        .map_err(db_error)?
    {
        return Ok(intent);
    }
    if let Ok(intent_id) = Uuid::parse_str(payment_id) {
        if let Some(intent) = repository.find_by_id(intent_id).await.map_err(db_error)? {
            return Ok(intent);
        }
    }

    Err(PaymentError::NotFound(format!(
        "Payment {payment_id} not found"
    )))
}
