use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::value_objects::payment_results::PaymentResult;

pub const DEFAULT_CURRENCY: &str = "USD";

/// Free-form method specific input (card details, VPA, ...) and intent metadata.
pub type PaymentFields = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessPaymentModel {
    pub method_id: String,
    pub amount: i64,
    pub currency: String,
    pub fields: PaymentFields,
    pub order_id: String,
    pub customer_id: Option<String>,
    pub metadata: PaymentFields,
    pub save_method: bool,
}

impl ProcessPaymentModel {
    /// Minimal request with the default currency and no extra fields.
    pub fn new(method_id: &str, amount: i64, order_id: &str) -> Self {
        Self {
            method_id: method_id.to_string(),
            amount,
            currency: DEFAULT_CURRENCY.to_string(),
            fields: PaymentFields::new(),
            order_id: order_id.to_string(),
            customer_id: None,
            metadata: PaymentFields::new(),
            save_method: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturePaymentModel {
    pub intent_id: String,
    pub amount: i64,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundPaymentModel {
    /// Provider reference of the payment, or the intent id itself.
    pub payment_id: String,
    pub amount: i64,
    pub currency: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOutcome {
    pub intent_id: Uuid,
    pub result: PaymentResult,
}

/// Reads a method field as text; clients send card numbers and months both as
/// strings and as numbers.
pub fn field_text(fields: &PaymentFields, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(value) => {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

/// Three ASCII letters, e.g. `USD` or `inr`.
pub fn is_valid_currency(currency: &str) -> bool {
    currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic())
}

pub fn normalize_currency(currency: &str) -> String {
    currency.trim().to_ascii_uppercase()
}
