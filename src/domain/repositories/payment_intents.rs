use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{
    payment_intents::PaymentIntentEntity, saved_payment_methods::SavedPaymentMethodEntity,
};

/// Returned (wrapped in `anyhow::Error`) by [`PaymentIntentRepository::update`]
/// when the stored intent moved on since it was read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("payment intent {intent_id} was modified concurrently (expected version {expected}, found {actual})")]
pub struct StaleIntentVersion {
    pub intent_id: Uuid,
    pub expected: i64,
    pub actual: i64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentIntentRepository: Send + Sync {
    async fn create(&self, intent: PaymentIntentEntity) -> Result<PaymentIntentEntity>;

    async fn find_by_id(&self, intent_id: Uuid) -> Result<Option<PaymentIntentEntity>>;

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<PaymentIntentEntity>>;

    /// Replaces the stored intent when its version still equals `intent.version`
    /// and returns the stored row with the version bumped.
    async fn update(&self, intent: PaymentIntentEntity) -> Result<PaymentIntentEntity>;

    async fn list_by_order(&self, order_id: &str) -> Result<Vec<PaymentIntentEntity>>;

    async fn save_payment_method(
        &self,
        method: SavedPaymentMethodEntity,
    ) -> Result<SavedPaymentMethodEntity>;

    async fn list_payment_methods(&self, customer_id: &str) -> Result<Vec<SavedPaymentMethodEntity>>;
}
