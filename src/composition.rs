use std::{collections::HashMap, sync::Arc, time::Duration};

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    application::usecases::{
        capture_payment::CapturePaymentUseCase,
        payment_errors::{PaymentError, UseCaseResult},
        process_payment::ProcessPaymentUseCase,
        refund_payment::{RefundPaymentUseCase, resolve_payment},
    },
    config::config_model::Payments,
    domain::{
        clock::{Clock, IdGenerator},
        entities::payment_intents::PaymentIntentEntity,
        providers::PaymentProvider,
        repositories::{
            payment_intents::PaymentIntentRepository, payment_methods::PaymentMethodRegistry,
        },
        value_objects::payment_methods::{
            CARD_METHOD_ID, CASH_ON_DELIVERY_METHOD_ID, PaymentMethodContract, UPI_METHOD_ID,
        },
    },
    infrastructure::{
        memory::{payment_intents::PaymentIntentInMemory, payment_methods::PaymentMethodInMemory},
        providers::{
            cash_on_delivery::CashOnDeliveryProvider, stripe::StripeProvider, upi::UpiProvider,
        },
    },
};

pub type ProcessUseCase = ProcessPaymentUseCase<PaymentIntentInMemory, PaymentMethodInMemory>;
pub type CaptureUseCase = CapturePaymentUseCase<PaymentIntentInMemory>;
pub type RefundUseCase = RefundPaymentUseCase<PaymentIntentInMemory>;

/// Wires providers, storage, clock and id generation for one process.
///
/// Providers are bound to method ids once, at construction: each registered
/// method goes to the first provider in `providers` that supports it.
pub struct PaymentContext {
    providers: HashMap<String, Arc<dyn PaymentProvider>>,
    method_registry: Arc<PaymentMethodInMemory>,
    payment_intent_repo: Arc<PaymentIntentInMemory>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    provider_timeout: Duration,
}

impl PaymentContext {
    pub fn new(
        providers: Vec<Arc<dyn PaymentProvider>>,
        method_registry: Arc<PaymentMethodInMemory>,
        payment_intent_repo: Arc<PaymentIntentInMemory>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        provider_timeout: Duration,
    ) -> Self {
        let mut table = HashMap::new();
        for contract in method_registry.list_contracts() {
            match providers.iter().find(|provider| provider.supports(&contract.id)) {
                Some(provider) => {
                    debug!(method_id = %contract.id, provider = provider.name(), "payments: provider bound");
                    table.insert(contract.id.clone(), Arc::clone(provider));
                }
                None => warn!(method_id = %contract.id, "payments: no provider handles registered method"),
            }
        }

        Self {
            providers: table,
            method_registry,
            payment_intent_repo,
            clock,
            ids,
            provider_timeout,
        }
    }

    /// Builds the production wiring: Stripe (only with a secret key), UPI and
    /// cash on delivery, in that priority order.
    pub fn from_config(config: &Payments, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        let mut providers: Vec<Arc<dyn PaymentProvider>> = Vec::new();
        if let Some(secret_key) = &config.stripe_secret_key {
            providers.push(Arc::new(StripeProvider::new(
                secret_key.clone(),
                Arc::clone(&ids),
            )));
        }
        providers.push(Arc::new(UpiProvider::new(
            config.upi_merchant_vpa.clone(),
            Arc::clone(&ids),
        )));
        providers.push(Arc::new(CashOnDeliveryProvider::new(Arc::clone(&ids))));

        let method_registry = PaymentMethodInMemory::new(vec![
            PaymentMethodContract::card(
                config.stripe_secret_key.is_some() && !config.is_disabled(CARD_METHOD_ID),
            ),
            PaymentMethodContract::upi(!config.is_disabled(UPI_METHOD_ID)),
            PaymentMethodContract::cash_on_delivery(
                !config.is_disabled(CASH_ON_DELIVERY_METHOD_ID),
            ),
        ]);

        let context = Self::new(
            providers,
            Arc::new(method_registry),
            Arc::new(PaymentIntentInMemory::new()),
            clock,
            ids,
            config.provider_timeout(),
        );
        let enabled_methods: Vec<String> = context
            .method_registry
            .list_enabled_contracts()
            .into_iter()
            .map(|contract| contract.id)
            .collect();
        info!(
            ?enabled_methods,
            provider_timeout_secs = config.provider_timeout_secs,
            "payments: context ready"
        );
        context
    }

    pub fn provider_for(&self, method_id: &str) -> UseCaseResult<Arc<dyn PaymentProvider>> {
        self.providers.get(method_id).cloned().ok_or_else(|| {
            PaymentError::Configuration(format!(
                "No provider found for payment method {method_id}"
            ))
        })
    }

    pub fn process_payment_use_case(&self, method_id: &str) -> UseCaseResult<ProcessUseCase> {
        Ok(ProcessPaymentUseCase::new(
            self.provider_for(method_id)?,
            Arc::clone(&self.payment_intent_repo),
            Arc::clone(&self.method_registry),
            Arc::clone(&self.clock),
            Arc::clone(&self.ids),
            self.provider_timeout,
        ))
    }

    pub fn capture_payment_use_case(&self, method_id: &str) -> UseCaseResult<CaptureUseCase> {
        Ok(CapturePaymentUseCase::new(
            self.provider_for(method_id)?,
            Arc::clone(&self.payment_intent_repo),
            Arc::clone(&self.clock),
            self.provider_timeout,
        ))
    }

    pub fn refund_payment_use_case(&self, method_id: &str) -> UseCaseResult<RefundUseCase> {
        Ok(RefundPaymentUseCase::new(
            self.provider_for(method_id)?,
            Arc::clone(&self.payment_intent_repo),
            Arc::clone(&self.clock),
            self.provider_timeout,
        ))
    }

    /// Picks the capture use-case by the method the intent was created with.
    pub async fn capture_use_case_for_intent(&self, intent_id: &str) -> UseCaseResult<CaptureUseCase> {
        let intent = self.find_intent(intent_id).await?;
        self.capture_payment_use_case(&intent.method_id)
    }

    pub async fn refund_use_case_for_payment(&self, payment_id: &str) -> UseCaseResult<RefundUseCase> {
        let intent = resolve_payment(self.payment_intent_repo.as_ref(), payment_id).await?;
        self.refund_payment_use_case(&intent.method_id)
    }

    pub async fn find_intent(&self, intent_id: &str) -> UseCaseResult<PaymentIntentEntity> {
        let not_found = || PaymentError::NotFound(format!("Payment intent {intent_id} not found"));
        let id = Uuid::parse_str(intent_id.trim()).map_err(|_| not_found())?;

        self.payment_intent_repo
            .find_by_id(id)
            .await
            .map_err(|err| {
                error!(%intent_id, db_error = ?err, "payments: failed to load intent");
                PaymentError::Internal(err)
            })?
            .ok_or_else(not_found)
    }

    pub fn method_registry(&self) -> &Arc<PaymentMethodInMemory> {
        &self.method_registry
    }

    pub fn payment_intent_repo(&self) -> &Arc<PaymentIntentInMemory> {
        &self.payment_intent_repo
    }
}
