use std::collections::HashMap;

use anyhow::{Result, bail};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    entities::{
        payment_intents::PaymentIntentEntity, saved_payment_methods::SavedPaymentMethodEntity,
    },
    repositories::payment_intents::{PaymentIntentRepository, StaleIntentVersion},
};

/// Process-lifetime store. One instance is shared by every use-case built from
/// the same `PaymentContext`.
#[derive(Default)]
pub struct PaymentIntentInMemory {
    intents: RwLock<HashMap<Uuid, PaymentIntentEntity>>,
    saved_methods: RwLock<Vec<SavedPaymentMethodEntity>>,
}

impl PaymentIntentInMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentIntentRepository for PaymentIntentInMemory {
    async fn create(&self, intent: PaymentIntentEntity) -> Result<PaymentIntentEntity> {
        let mut intents = self.intents.write().await;
        if intents.contains_key(&intent.id) {
            bail!("payment intent {} already exists", intent.id);
        }
        intents.insert(intent.id, intent.clone());
        Ok(intent)
    }

    async fn find_by_id(&self, intent_id: Uuid) -> Result<Option<PaymentIntentEntity>> {
        Ok(self.intents.read().await.get(&intent_id).cloned())
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<PaymentIntentEntity>> {
        Ok(self
            .intents
            .read()
            .await
            .values()
            .find(|intent| intent.external_id.as_deref() == Some(external_id))
            .cloned())
    }

    async fn update(&self, intent: PaymentIntentEntity) -> Result<PaymentIntentEntity> {
        let mut intents = self.intents.write().await;
        let Some(stored) = intents.get_mut(&intent.id) else {
            bail!("payment intent {} does not exist", intent.id);
        };
        if stored.version != intent.version {
            return Err(StaleIntentVersion {
                intent_id: intent.id,
                expected: intent.version,
                actual: stored.version,
            }
            .into());
        }

        *stored = PaymentIntentEntity {
            version: intent.version + 1,
            ..intent
        };
        Ok(stored.clone())
    }

    async fn list_by_order(&self, order_id: &str) -> Result<Vec<PaymentIntentEntity>> {
        let mut intents: Vec<PaymentIntentEntity> = self
            .intents
            .read()
            .await
            .values()
            .filter(|intent| intent.order_id == order_id)
            .cloned()
            .collect();
        intents.sort_by_key(|intent| (intent.created_at, intent.id));
        Ok(intents)
    }

    async fn save_payment_method(
        &self,
        method: SavedPaymentMethodEntity,
    ) -> Result<SavedPaymentMethodEntity> {
        let mut saved_methods = self.saved_methods.write().await;
        // One entry per customer and label; re-saving refreshes the reference.
        match saved_methods.iter_mut().find(|existing| {
            existing.customer_id == method.customer_id
                && existing.method_id == method.method_id
                && existing.label == method.label
        }) {
            Some(existing) => {
                existing.external_ref = method.external_ref;
                Ok(existing.clone())
            }
            None => {
                saved_methods.push(method.clone());
                Ok(method)
            }
        }
    }

    async fn list_payment_methods(&self, customer_id: &str) -> Result<Vec<SavedPaymentMethodEntity>> {
        Ok(self
            .saved_methods
            .read()
            .await
            .iter()
            .filter(|method| method.customer_id == customer_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{
        enums::payment_statuses::PaymentStatus, payments::PaymentFields,
    };
    use chrono::{Duration, TimeZone, Utc};

    fn sample_intent(id: u128, order_id: &str, minutes: i64) -> PaymentIntentEntity {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes);
        PaymentIntentEntity {
            id: Uuid::from_u128(id),
            order_id: order_id.to_string(),
            customer_id: Some("c1".to_string()),
            method_id: "upi".to_string(),
            amount: 100,
            currency: "USD".to_string(),
            status: PaymentStatus::Authorized,
            external_id: Some(format!("upi_{id}")),
            receipt_url: None,
            last_error: None,
            metadata: PaymentFields::new(),
            created_at: now,
            updated_at: now,
            version: 1,
            in_flight: false,
        }
    }

    #[tokio::test]
    async fn create_then_find_by_id_and_external_id() {
        let repository = PaymentIntentInMemory::new();
        repository.create(sample_intent(1, "o1", 0)).await.unwrap();

        let by_id = repository.find_by_id(Uuid::from_u128(1)).await.unwrap();
        let by_external = repository.find_by_external_id("upi_1").await.unwrap();

        assert_eq!(by_id.as_ref().map(|i| i.id), Some(Uuid::from_u128(1)));
        assert_eq!(by_id, by_external);
        assert!(repository.find_by_id(Uuid::from_u128(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_create_is_rejected() {
        let repository = PaymentIntentInMemory::new();
        repository.create(sample_intent(1, "o1", 0)).await.unwrap();

        assert!(repository.create(sample_intent(1, "o1", 0)).await.is_err());
    }

    #[tokio::test]
    async fn update_bumps_version_and_rejects_stale_writes() {
        let repository = PaymentIntentInMemory::new();
        let created = repository.create(sample_intent(1, "o1", 0)).await.unwrap();

        let mut first = created.clone();
        first.status = PaymentStatus::Captured;
        let stored = repository.update(first).await.unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.status, PaymentStatus::Captured);

        let mut stale = created;
        stale.status = PaymentStatus::Refunded;
        let err = repository.update(stale).await.unwrap_err();
        let stale_error = err.downcast_ref::<StaleIntentVersion>().unwrap();
        assert_eq!(stale_error.expected, 1);
        assert_eq!(stale_error.actual, 2);

        let current = repository.find_by_id(Uuid::from_u128(1)).await.unwrap().unwrap();
        assert_eq!(current.status, PaymentStatus::Captured);
    }

    #[tokio::test]
    async fn update_of_unknown_intent_fails() {
        let repository = PaymentIntentInMemory::new();

        assert!(repository.update(sample_intent(9, "o1", 0)).await.is_err());
    }

    #[tokio::test]
    async fn list_by_order_is_sorted_by_creation() {
        let repository = PaymentIntentInMemory::new();
        repository.create(sample_intent(2, "o1", 10)).await.unwrap();
        repository.create(sample_intent(1, "o1", 0)).await.unwrap();
        repository.create(sample_intent(3, "o2", 5)).await.unwrap();

        let ids: Vec<Uuid> = repository
            .list_by_order("o1")
            .await
            .unwrap()
            .into_iter()
            .map(|intent| intent.id)
            .collect();

        assert_eq!(ids, vec![Uuid::from_u128(1), Uuid::from_u128(2)]);
    }

    #[tokio::test]
    async fn saved_methods_are_scoped_per_customer_and_deduplicated() {
        let repository = PaymentIntentInMemory::new();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let method = |id: u128, customer: &str, external_ref: &str| SavedPaymentMethodEntity {
            id: Uuid::from_u128(id),
            customer_id: customer.to_string(),
            method_id: "upi".to_string(),
            label: "user@bank".to_string(),
            external_ref: Some(external_ref.to_string()),
            created_at: now,
        };

        repository.save_payment_method(method(1, "c1", "upi_1")).await.unwrap();
        let refreshed = repository.save_payment_method(method(2, "c1", "upi_2")).await.unwrap();
        repository.save_payment_method(method(3, "c2", "upi_3")).await.unwrap();

        assert_eq!(refreshed.id, Uuid::from_u128(1));
        let c1_methods = repository.list_payment_methods("c1").await.unwrap();
        assert_eq!(c1_methods.len(), 1);
        assert_eq!(c1_methods[0].external_ref.as_deref(), Some("upi_2"));
        assert_eq!(repository.list_payment_methods("c2").await.unwrap().len(), 1);
    }
}
