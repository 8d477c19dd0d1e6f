use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A payment method a customer chose to keep for later checkouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPaymentMethodEntity {
    pub id: Uuid,
    pub customer_id: String,
    pub method_id: String,
    pub label: String,
    /// Provider reference of the payment that produced this method.
    pub external_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}
