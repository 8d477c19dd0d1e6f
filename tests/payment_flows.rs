use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use grocery_payments::{
    application::usecases::payment_errors::PaymentError,
    composition::PaymentContext,
    config::config_model::Payments,
    domain::{
        clock::{FixedClock, SequentialIdGenerator},
        providers::ProviderOperation,
        repositories::payment_intents::PaymentIntentRepository,
        value_objects::{
            enums::payment_statuses::PaymentStatus,
            payments::{CapturePaymentModel, ProcessPaymentModel, RefundPaymentModel},
        },
    },
};
use serde_json::json;

fn context_with_clock(clock: Arc<FixedClock>) -> PaymentContext {
    PaymentContext::from_config(
        &Payments {
            stripe_secret_key: Some("sk_test_grocer".to_string()),
            ..Payments::default()
        },
        clock,
        Arc::new(SequentialIdGenerator::new()),
    )
}

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap(),
    ))
}

fn upi_model() -> ProcessPaymentModel {
    let mut model = ProcessPaymentModel::new("upi", 100, "o1");
    model.currency = "USD".to_string();
    model.fields = json!({ "vpa": "user@bank" }).as_object().cloned().unwrap();
    model
}

#[tokio::test]
async fn upi_payment_is_authorized_with_upi_reference() {
    let context = context_with_clock(clock());

    let outcome = context
        .process_payment_use_case("upi")
        .unwrap()
        .execute(upi_model())
        .await
        .unwrap();

    assert_eq!(outcome.result.status(), PaymentStatus::Authorized);
    assert!(outcome.result.external_id().unwrap().starts_with("upi_"));
}

#[tokio::test]
async fn cash_on_delivery_stays_pending_and_cannot_settle() {
    let context = context_with_clock(clock());

    let outcome = context
        .process_payment_use_case("cash_on_delivery")
        .unwrap()
        .execute(ProcessPaymentModel::new("cash_on_delivery", 50, "o2"))
        .await
        .unwrap();

    assert_eq!(outcome.result.status(), PaymentStatus::Pending);
    assert!(outcome.result.external_id().is_some());

    let err = context
        .capture_use_case_for_intent(&outcome.intent_id.to_string())
        .await
        .unwrap()
        .execute(CapturePaymentModel {
            intent_id: outcome.intent_id.to_string(),
            amount: 50,
            currency: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PaymentError::UnsupportedOperation {
            operation: ProviderOperation::Capture,
            ..
        }
    ));
}

#[tokio::test]
async fn invalid_vpa_fails_without_error() {
    let context = context_with_clock(clock());
    let mut model = upi_model();
    model.fields = json!({ "vpa": "not a vpa" }).as_object().cloned().unwrap();

    let outcome = context
        .process_payment_use_case("upi")
        .unwrap()
        .execute(model)
        .await
        .unwrap();

    assert_eq!(outcome.result.status(), PaymentStatus::Failed);
    assert!(outcome.result.error().is_some());
    let stored = context
        .payment_intent_repo()
        .find_by_id(outcome.intent_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, PaymentStatus::Failed);
}

#[tokio::test]
async fn unregistered_method_has_no_provider() {
    let context = context_with_clock(clock());

    let err = context.process_payment_use_case("bitcoin").err().unwrap();

    assert!(matches!(err, PaymentError::Configuration(msg) if msg.contains("No provider found for payment method")));
}

#[tokio::test]
async fn missing_intent_cannot_be_captured() {
    let context = context_with_clock(clock());

    let err = context.capture_use_case_for_intent("missing").await.err().unwrap();

    assert!(matches!(err, PaymentError::NotFound(_)));
}

#[tokio::test]
async fn card_payment_runs_process_capture_refund() {
    let clock = clock();
    let context = context_with_clock(Arc::clone(&clock));
    let mut model = ProcessPaymentModel::new("card", 2500, "o3");
    model.customer_id = Some("c7".to_string());
    model.save_method = true;
    model.fields = json!({
        "cardNumber": "4242 4242 4242 4242",
        "expMonth": "12",
        "expYear": "2030",
        "cvc": "123"
    })
    .as_object()
    .cloned()
    .unwrap();

    let processed = context
        .process_payment_use_case("card")
        .unwrap()
        .execute(model)
        .await
        .unwrap();
    assert_eq!(processed.result.status(), PaymentStatus::Authorized);
    let intent_id = processed.intent_id.to_string();

    clock.advance(Duration::minutes(5));
    let captured = context
        .capture_use_case_for_intent(&intent_id)
        .await
        .unwrap()
        .execute(CapturePaymentModel {
            intent_id: intent_id.clone(),
            amount: 2500,
            currency: Some("usd".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(captured.result.status(), PaymentStatus::Captured);
    assert!(captured.result.receipt_url().is_some());

    let external_id = captured.result.external_id().unwrap().to_string();
    let refunded = context
        .refund_use_case_for_payment(&external_id)
        .await
        .unwrap()
        .execute(RefundPaymentModel {
            payment_id: external_id.clone(),
            amount: 2500,
            currency: None,
            reason: Some("out of stock".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(refunded.result.status(), PaymentStatus::Refunded);

    let stored = context.find_intent(&intent_id).await.unwrap();
    assert_eq!(stored.status, PaymentStatus::Refunded);
    assert_eq!(stored.version, 5);
    assert!(!stored.in_flight);
    assert_eq!(stored.created_at, Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap());
    assert_eq!(stored.updated_at, Utc.with_ymd_and_hms(2024, 6, 1, 8, 35, 0).unwrap());

    let saved = context
        .payment_intent_repo()
        .list_payment_methods("c7")
        .await
        .unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].label, "Card ending 4242");
}
