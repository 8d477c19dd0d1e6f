use tracing::error;

use crate::{
    application::usecases::payment_errors::{PaymentError, UseCaseResult},
    domain::{
        entities::payment_intents::PaymentIntentEntity,
        repositories::payment_intents::PaymentIntentRepository,
    },
};

/// Marks the intent in flight with a versioned write before the provider is
/// called. Of two requests that read the same version only one gets past
/// here; the other fails with a conflict and never reaches the provider.
pub(crate) async fn claim_intent<R>(
    repository: &R,
    mut intent: PaymentIntentEntity,
) -> UseCaseResult<PaymentIntentEntity>
where
    R: PaymentIntentRepository + ?Sized,
{
    if intent.in_flight {
        return Err(PaymentError::Conflict(format!(
            "Payment intent {} is already being processed",
            intent.id
        )));
    }
    intent.in_flight = true;
    repository
        .update(intent)
        .await
        .map_err(PaymentError::from_update)
}

/// Drops the claim after the provider call errored without a result.
pub(crate) async fn release_intent<R>(repository: &R, mut intent: PaymentIntentEntity)
where
    R: PaymentIntentRepository + ?Sized,
{
    let intent_id = intent.id;
    intent.in_flight = false;
    if let Err(err) = repository.update(intent).await {
        error!(%intent_id, db_error = ?err, "payments: failed to release payment intent claim");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            entities::payment_intents::NewPaymentIntent,
            value_objects::{payment_results::PaymentResult, payments::PaymentFields},
        },
        infrastructure::memory::payment_intents::PaymentIntentInMemory,
    };
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    async fn seeded() -> (PaymentIntentInMemory, PaymentIntentEntity) {
        let repository = PaymentIntentInMemory::new();
        let intent = PaymentIntentEntity::from_result(
            NewPaymentIntent {
                id: Uuid::from_u128(9),
                order_id: "o1".to_string(),
                customer_id: None,
                method_id: "upi".to_string(),
                amount: 100,
                currency: "USD".to_string(),
                metadata: PaymentFields::new(),
            },
            &PaymentResult::authorized("upi_9"),
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        );
        let intent = repository.create(intent).await.unwrap();
        (repository, intent)
    }

    #[tokio::test]
    async fn second_claim_on_same_read_conflicts() {
        let (repository, read) = seeded().await;

        let claimed = claim_intent(&repository, read.clone()).await.unwrap();
        let err = claim_intent(&repository, read).await.unwrap_err();

        assert!(claimed.in_flight);
        assert_eq!(claimed.version, 2);
        assert!(matches!(err, PaymentError::Conflict(_)));
    }

    #[tokio::test]
    async fn claimed_intent_cannot_be_claimed_again() {
        let (repository, read) = seeded().await;
        claim_intent(&repository, read).await.unwrap();

        let fresh = repository.find_by_id(Uuid::from_u128(9)).await.unwrap().unwrap();
        let err = claim_intent(&repository, fresh).await.unwrap_err();

        assert!(matches!(err, PaymentError::Conflict(msg) if msg.contains("already being processed")));
    }

    #[tokio::test]
    async fn release_clears_the_claim() {
        let (repository, read) = seeded().await;
        let claimed = claim_intent(&repository, read).await.unwrap();

        release_intent(&repository, claimed).await;

        let stored = repository.find_by_id(Uuid::from_u128(9)).await.unwrap().unwrap();
        assert!(!stored.in_flight);
        assert_eq!(stored.version, 3);
    }
}
