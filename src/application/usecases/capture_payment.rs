use std::{sync::Arc, time::Duration};

use tracing::{error, info};
use uuid::Uuid;

use crate::{
    application::usecases::{
        intent_claims::{claim_intent, release_intent},
        payment_errors::{PaymentError, UseCaseResult},
        provider_calls::call_provider,
    },
    domain::{
        clock::Clock,
        entities::payment_intents::PaymentIntentEntity,
        providers::{CaptureParams, PaymentProvider, ProviderOperation},
        repositories::payment_intents::PaymentIntentRepository,
        value_objects::payments::{CapturePaymentModel, PaymentOutcome, normalize_currency},
    },
};

pub struct CapturePaymentUseCase<R>
where
    R: PaymentIntentRepository + Send + Sync + 'static,
{
    provider: Arc<dyn PaymentProvider>,
    payment_intent_repo: Arc<R>,
    clock: Arc<dyn Clock>,
    provider_timeout: Duration,
}

impl<R> CapturePaymentUseCase<R>
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

    pub async fn execute(&self, model: CapturePaymentModel) -> UseCaseResult<PaymentOutcome> {
        info!(intent_id = %model.intent_id, amount = model.amount, "payments: capture request received");
        let intent = self.load_intent(&model.intent_id).await?;

        ensure_owned_by(self.provider.as_ref(), &intent)?;
        if !intent.status.is_capturable() {
            return Err(PaymentError::Validation(format!(
                "Payment intent {} cannot be captured while {}",
                intent.id, intent.status
            )));
        }
        validate_settlement(&intent, model.amount, model.currency.as_deref())?;
        let external_id = provider_reference(&intent)?;
        if !self.provider.capabilities().capture {
            return Err(PaymentError::UnsupportedOperation {
                provider: self.provider.name(),
                operation: ProviderOperation::Capture,
            });
        }

        let repository = self.payment_intent_repo.as_ref();
        let mut intent = claim_intent(repository, intent).await?;
        let called = call_provider(
            self.provider.name(),
            ProviderOperation::Capture,
            self.provider_timeout,
            Some(external_id.clone()),
            self.provider.capture(CaptureParams {
                external_id,
                amount: model.amount,
                currency: intent.currency.clone(),
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

        intent.apply_result(&result, self.clock.now());
        let intent = repository
            .update(intent)
            .await
            .map_err(PaymentError::from_update)?;

        info!(
            intent_id = %intent.id,
            status = %intent.status,
            version = intent.version,
            "payments: capture finished"
        );
        Ok(PaymentOutcome {
            intent_id: intent.id,
            result,
        })
    }

    async fn load_intent(&self, raw_intent_id: &str) -> UseCaseResult<PaymentIntentEntity> {
        let not_found = || PaymentError::NotFound(format!("Payment intent {raw_intent_id} not found"));
        let intent_id = Uuid::parse_str(raw_intent_id.trim()).map_err(|_| not_found())?;

        self.payment_intent_repo
            .find_by_id(intent_id)
            .await
            .map_err(|err| {
                error!(%intent_id, db_error = ?err, "payments: failed to load payment intent");
                PaymentError::Internal(err)
            })?
            .ok_or_else(not_found)
    }
}

/// Capture and refund must go back to the provider that created the intent.
pub(crate) fn ensure_owned_by(
    provider: &dyn PaymentProvider,
    intent: &PaymentIntentEntity,
) -> UseCaseResult<()> {
    if !provider.supports(&intent.method_id) {
        return Err(PaymentError::Validation(format!(
            "Payment intent {} was created with {} and cannot be handled by {}",
            intent.id,
            intent.method_id,
            provider.name()
        )));
    }
    Ok(())
}

pub(crate) fn validate_settlement(
    intent: &PaymentIntentEntity,
    amount: i64,
    currency: Option<&str>,
) -> UseCaseResult<()> {
    if amount <= 0 {
        return Err(PaymentError::Validation(
            "amount must be greater than zero".to_string(),
        ));
    }
    if amount > intent.amount {
        return Err(PaymentError::Validation(format!(
            "amount {amount} exceeds the payment amount {}",
            intent.amount
        )));
    }
    if let Some(currency) = currency {
        if normalize_currency(currency) != intent.currency {
            return Err(PaymentError::Validation(format!(
                "currency {currency} does not match the payment currency {}",
                intent.currency
            )));
        }
    }
    Ok(())
}

pub(crate) fn provider_reference(intent: &PaymentIntentEntity) -> UseCaseResult<String> {
    intent.external_id.clone().ok_or_else(|| {
        PaymentError::Validation(format!(
            "Payment intent {} has no provider reference",
            intent.id
        ))
    })
}
