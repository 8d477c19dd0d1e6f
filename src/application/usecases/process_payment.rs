use std::{sync::Arc, time::Duration};

use tracing::{error, info, warn};

use crate::{
    application::usecases::{
        payment_errors::{PaymentError, UseCaseResult},
        provider_calls::call_provider,
    },
    domain::{
        clock::{Clock, IdGenerator},
        entities::{
            payment_intents::{NewPaymentIntent, PaymentIntentEntity},
            saved_payment_methods::SavedPaymentMethodEntity,
        },
        providers::{AuthorizeParams, PaymentProvider, ProviderOperation},
        repositories::{
            payment_intents::PaymentIntentRepository, payment_methods::PaymentMethodRegistry,
        },
        value_objects::{
            payment_methods::PaymentMethodContract,
            payment_results::PaymentResult,
            payments::{
                PaymentOutcome, ProcessPaymentModel, field_text, is_valid_currency,
                normalize_currency,
            },
        },
    },
};

pub struct ProcessPaymentUseCase<R, M>
where
    R: PaymentIntentRepository + Send + Sync + 'static,
    M: PaymentMethodRegistry + Send + Sync + 'static,
{
    provider: Arc<dyn PaymentProvider>,
    payment_intent_repo: Arc<R>,
    method_registry: Arc<M>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    provider_timeout: Duration,
}

impl<R, M> ProcessPaymentUseCase<R, M>
where
    R: PaymentIntentRepository + Send + Sync + 'static,
    M: PaymentMethodRegistry + Send + Sync + 'static,
{
    pub fn new(
        provider: Arc<dyn PaymentProvider>,
        payment_intent_repo: Arc<R>,
        method_registry: Arc<M>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            payment_intent_repo,
            method_registry,
            clock,
            ids,
            provider_timeout,
        }
    }

    pub async fn execute(&self, model: ProcessPaymentModel) -> UseCaseResult<PaymentOutcome> {
        info!(
            method_id = %model.method_id,
            order_id = %model.order_id,
            amount = model.amount,
            "payments: process request received"
        );
        let contract = self.enabled_contract(&model.method_id)?;

        if !self.provider.supports(&model.method_id) {
            return Err(PaymentError::Configuration(format!(
                "Provider {} cannot handle payment method {}",
                self.provider.name(),
                model.method_id
            )));
        }
        if model.amount <= 0 {
            return Err(PaymentError::Validation(
                "amount must be greater than zero".to_string(),
            ));
        }
        let order_id = model.order_id.trim().to_string();
        if order_id.is_empty() {
            return Err(PaymentError::Validation("orderId is required".to_string()));
        }
        if !is_valid_currency(model.currency.trim()) {
            return Err(PaymentError::Validation(format!(
                "currency {} is not a valid ISO code",
                model.currency
            )));
        }
        let currency = normalize_currency(&model.currency);

        let params = AuthorizeParams {
            amount: model.amount,
            currency: currency.clone(),
            fields: model.fields.clone(),
            order_id: order_id.clone(),
            customer_id: model.customer_id.clone(),
        };
        let provider_name = self.provider.name();
        let result = if self.provider.capabilities().defers_settlement {
            call_provider(
                provider_name,
                ProviderOperation::MarkPending,
                self.provider_timeout,
                None,
                self.provider.mark_pending(params),
            )
            .await?
        } else {
            call_provider(
                provider_name,
                ProviderOperation::Authorize,
                self.provider_timeout,
                None,
                self.provider.authorize(params),
            )
            .await?
        };

        let now = self.clock.now();
        let intent = PaymentIntentEntity::from_result(
            NewPaymentIntent {
                id: self.ids.next_id(),
                order_id,
                customer_id: model.customer_id.clone(),
                method_id: model.method_id.clone(),
                amount: model.amount,
                currency,
                metadata: model.metadata.clone(),
            },
            &result,
            now,
        );
        let intent = self
            .payment_intent_repo
            .create(intent)
            .await
            .map_err(|err| {
                error!(
                    order_id = %model.order_id,
                    db_error = ?err,
                    "payments: failed to persist payment intent"
                );
                PaymentError::Internal(err)
            })?;

        if model.save_method && !result.is_failed() {
            self.save_method(&model, &contract, &result).await;
        }

        info!(
            intent_id = %intent.id,
            status = %result.status(),
            provider = provider_name,
            "payments: payment processed"
        );
        Ok(PaymentOutcome {
            intent_id: intent.id,
            result,
        })
    }

    fn enabled_contract(&self, method_id: &str) -> UseCaseResult<PaymentMethodContract> {
        match self.method_registry.get_contract(method_id) {
            Some(contract) if contract.enabled => Ok(contract),
            Some(_) => Err(PaymentError::Validation(format!(
                "Payment method {method_id} is disabled"
            ))),
            None => Err(PaymentError::Validation(format!(
                "Unknown payment method {method_id}"
            ))),
        }
    }

    /// Saving the method is best effort: the payment already went through.
    async fn save_method(
        &self,
        model: &ProcessPaymentModel,
        contract: &PaymentMethodContract,
        result: &PaymentResult,
    ) {
        let Some(customer_id) = model.customer_id.clone() else {
            return;
        };

        let method = SavedPaymentMethodEntity {
            id: self.ids.next_id(),
            customer_id,
            method_id: model.method_id.clone(),
            label: method_label(model, contract),
            external_ref: result.external_id().map(str::to_string),
            created_at: self.clock.now(),
        };
        if let Err(err) = self.payment_intent_repo.save_payment_method(method).await {
            warn!(
                method_id = %model.method_id,
                db_error = ?err,
                "payments: failed to save customer payment method"
            );
        }
    }
}

fn method_label(model: &ProcessPaymentModel, contract: &PaymentMethodContract) -> String {
    if let Some(vpa) = field_text(&model.fields, "vpa") {
        return vpa;
    }
    if let Some(card_number) = field_text(&model.fields, "cardNumber") {
        let digits: Vec<char> = card_number.chars().filter(char::is_ascii_digit).collect();
        if digits.len() >= 4 {
            let last4: String = digits[digits.len() - 4..].iter().collect();
            return format!("Card ending {last4}");
        }
    }
    contract.display_name.clone()
}
