use serde::Serialize;

pub const CARD_METHOD_ID: &str = "card";
pub const UPI_METHOD_ID: &str = "upi";
pub const CASH_ON_DELIVERY_METHOD_ID: &str = "cash_on_delivery";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFieldContract {
    pub name: String,
    pub label: String,
    pub required: bool,
}

impl PaymentFieldContract {
    pub fn required(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            required: true,
        }
    }
}

/// Describes one checkout option as shown to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodContract {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub required_fields: Vec<PaymentFieldContract>,
    pub enabled: bool,
}

impl PaymentMethodContract {
    pub fn card(enabled: bool) -> Self {
        Self {
            id: CARD_METHOD_ID.to_string(),
            display_name: "Credit / Debit Card".to_string(),
            description: "Pay securely with Visa, Mastercard or RuPay".to_string(),
            required_fields: vec![
                PaymentFieldContract::required("cardNumber", "Card number"),
                PaymentFieldContract::required("expMonth", "Expiry month"),
                PaymentFieldContract::required("expYear", "Expiry year"),
                PaymentFieldContract::required("cvc", "CVC"),
            ],
            enabled,
        }
    }

    pub fn upi(enabled: bool) -> Self {
        Self {
            id: UPI_METHOD_ID.to_string(),
            display_name: "UPI".to_string(),
            description: "Pay from any UPI app using your VPA".to_string(),
            required_fields: vec![PaymentFieldContract::required("vpa", "UPI ID")],
            enabled,
        }
    }

    pub fn cash_on_delivery(enabled: bool) -> Self {
        Self {
            id: CASH_ON_DELIVERY_METHOD_ID.to_string(),
            display_name: "Cash on Delivery".to_string(),
            description: "Pay in cash when your groceries arrive".to_string(),
            required_fields: Vec::new(),
            enabled,
        }
    }
}
