use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Authorized,
    Captured,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Authorized => "authorized",
            PaymentStatus::Captured => "captured",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(PaymentStatus::Pending),
            "authorized" => Some(PaymentStatus::Authorized),
            "captured" => Some(PaymentStatus::Captured),
            "failed" => Some(PaymentStatus::Failed),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }

    /// Statuses from which a capture may settle the payment.
    pub fn is_capturable(&self) -> bool {
        matches!(self, PaymentStatus::Authorized | PaymentStatus::Pending)
    }

    pub fn is_refundable(&self) -> bool {
        matches!(self, PaymentStatus::Captured)
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_lowercase_strings() {
        let json = serde_json::to_string(&PaymentStatus::Authorized).unwrap();
        assert_eq!(json, "\"authorized\"");

        let parsed: PaymentStatus = serde_json::from_str("\"refunded\"").unwrap();
        assert_eq!(parsed, PaymentStatus::Refunded);
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert_eq!(PaymentStatus::from_str("settled"), None);
        assert!(serde_json::from_str::<PaymentStatus>("\"settled\"").is_err());
    }

    #[test]
    fn only_open_payments_are_capturable() {
        assert!(PaymentStatus::Authorized.is_capturable());
        assert!(PaymentStatus::Pending.is_capturable());
        assert!(!PaymentStatus::Captured.is_capturable());
        assert!(!PaymentStatus::Failed.is_capturable());
        assert!(PaymentStatus::Captured.is_refundable());
        assert!(!PaymentStatus::Refunded.is_refundable());
    }
}
