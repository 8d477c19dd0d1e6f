use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::value_objects::{
    enums::payment_statuses::PaymentStatus, payment_results::PaymentResult,
    payments::PaymentFields,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentEntity {
    pub id: Uuid,
    pub order_id: String,
    pub customer_id: Option<String>,
    pub method_id: String,
    /// Smallest currency unit.
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub external_id: Option<String>,
    pub receipt_url: Option<String>,
    pub last_error: Option<String>,
    pub metadata: PaymentFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped by the repository on every successful update.
    pub version: i64,
    /// Set while a capture or refund is out at the provider.
    pub in_flight: bool,
}

pub struct NewPaymentIntent {
    pub id: Uuid,
    pub order_id: String,
    pub customer_id: Option<String>,
    pub method_id: String,
    pub amount: i64,
    pub currency: String,
    pub metadata: PaymentFields,
}

impl PaymentIntentEntity {
    pub fn from_result(
        new_intent: NewPaymentIntent,
        result: &PaymentResult,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_intent.id,
            order_id: new_intent.order_id,
            customer_id: new_intent.customer_id,
            method_id: new_intent.method_id,
            amount: new_intent.amount,
            currency: new_intent.currency,
            status: result.status(),
            external_id: result.external_id().map(str::to_string),
            receipt_url: result.receipt_url().map(str::to_string),
            last_error: result.error().map(str::to_string),
            metadata: new_intent.metadata,
            created_at: now,
            updated_at: now,
            version: 1,
            in_flight: false,
        }
    }

    /// Folds a capture/refund result into the intent.
    ///
    /// A failed follow-up operation leaves the settled status untouched and only
    /// records the error; the earlier authorization or capture still stands.
    pub fn apply_result(&mut self, result: &PaymentResult, now: DateTime<Utc>) {
        if result.is_failed() {
            self.last_error = result.error().map(str::to_string);
        } else {
            self.status = result.status();
            self.last_error = None;
            if let Some(external_id) = result.external_id() {
                self.external_id = Some(external_id.to_string());
            }
            if let Some(receipt_url) = result.receipt_url() {
                self.receipt_url = Some(receipt_url.to_string());
            }
        }
        self.in_flight = false;
        self.updated_at = now;
    }
}
