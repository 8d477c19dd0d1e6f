use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::{
    clock::IdGenerator,
    providers::{
        AuthorizeParams, CaptureParams, PaymentProvider, ProviderCapabilities, ProviderError,
        ProviderOperation, ProviderResult, RefundParams, ensure_positive_amount,
    },
    value_objects::{
        payment_methods::CARD_METHOD_ID, payment_results::PaymentResult, payments::field_text,
    },
};

const PROVIDER_NAME: &str = "stripe";
const SUPPORTED_METHODS: [&str; 2] = [CARD_METHOD_ID, "stripe"];
const EXTERNAL_ID_PREFIX: &str = "pi_";
const RECEIPT_BASE_URL: &str = "https://pay.stripe.com/receipts";

/// Card payments through Stripe: authorize first, capture later.
///
/// The network call is simulated; the adapter validates card fields the way
/// Stripe would reject them and hands out `pi_` references.
pub struct StripeProvider {
    secret_key: String,
    ids: Arc<dyn IdGenerator>,
}

impl StripeProvider {
    pub fn new(secret_key: String, ids: Arc<dyn IdGenerator>) -> Self {
        Self { secret_key, ids }
    }

    fn is_live_mode(&self) -> bool {
        self.secret_key.starts_with("sk_live_")
    }

    fn ensure_configured(&self) -> Result<(), ProviderError> {
        if self.secret_key.trim().is_empty() {
            return Err(ProviderError::Unavailable(
                "Stripe secret key is not configured".to_string(),
            ));
        }
        Ok(())
    }

    fn ensure_own_reference(external_id: &str) -> Result<(), ProviderError> {
        if !external_id.starts_with(EXTERNAL_ID_PREFIX) {
            return Err(ProviderError::Declined(format!(
                "{external_id} is not a Stripe payment"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn supports(&self, method_id: &str) -> bool {
        SUPPORTED_METHODS.contains(&method_id)
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            capture: true,
            refund: true,
            defers_settlement: false,
        }
    }

    async fn authorize(&self, params: AuthorizeParams) -> ProviderResult {
        self.ensure_configured()?;
        ensure_positive_amount(params.amount)?;

        if let Err(reason) = validate_card_fields(&params) {
            warn!(order_id = %params.order_id, %reason, "payments: stripe card rejected");
            return Ok(PaymentResult::failed(reason));
        }

        let external_id = format!("{EXTERNAL_ID_PREFIX}{}", self.ids.next_id().simple());
        info!(
            order_id = %params.order_id,
            %external_id,
            amount = params.amount,
            currency = %params.currency,
            live_mode = self.is_live_mode(),
            "payments: stripe payment authorized"
        );
        Ok(PaymentResult::authorized(external_id))
    }

    async fn capture(&self, params: CaptureParams) -> ProviderResult {
        self.ensure_configured()?;
        ensure_positive_amount(params.amount)?;
        Self::ensure_own_reference(&params.external_id)?;

        let receipt_url = format!("{RECEIPT_BASE_URL}/{}", params.external_id);
        debug!(external_id = %params.external_id, amount = params.amount, "payments: stripe capture");
        Ok(PaymentResult::captured(params.external_id, Some(receipt_url)))
    }

    async fn refund(&self, params: RefundParams) -> ProviderResult {
        self.ensure_configured()?;
        ensure_positive_amount(params.amount)?;
        Self::ensure_own_reference(&params.external_id)?;

        debug!(
            external_id = %params.external_id,
            amount = params.amount,
            reason = ?params.reason,
            "payments: stripe refund"
        );
        Ok(PaymentResult::refunded(params.external_id))
    }

    async fn mark_pending(&self, _params: AuthorizeParams) -> ProviderResult {
        Err(ProviderError::unsupported(
            PROVIDER_NAME,
            ProviderOperation::MarkPending,
        ))
    }
}

fn validate_card_fields(params: &AuthorizeParams) -> Result<(), String> {
    let card_number = field_text(&params.fields, "cardNumber")
        .ok_or_else(|| "Card number is required".to_string())?;
    let digits: String = card_number
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    if !(12..=19).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err("Card number is invalid".to_string());
    }
    if !passes_luhn(&digits) {
        return Err("Card number is invalid".to_string());
    }

    let exp_month = field_text(&params.fields, "expMonth")
        .and_then(|raw| raw.parse::<u32>().ok())
        .ok_or_else(|| "Expiry month is required".to_string())?;
    if !(1..=12).contains(&exp_month) {
        return Err("Expiry month must be between 1 and 12".to_string());
    }

    let exp_year = field_text(&params.fields, "expYear")
        .ok_or_else(|| "Expiry year is required".to_string())?;
    if !matches!(exp_year.len(), 2 | 4) || !exp_year.chars().all(|c| c.is_ascii_digit()) {
        return Err("Expiry year is invalid".to_string());
    }

    let cvc = field_text(&params.fields, "cvc").ok_or_else(|| "CVC is required".to_string())?;
    if !matches!(cvc.len(), 3 | 4) || !cvc.chars().all(|c| c.is_ascii_digit()) {
        return Err("CVC is invalid".to_string());
    }

    Ok(())
}

/// `digits` must be ASCII digits only.
fn passes_luhn(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(index, byte)| {
            let digit = u32::from(byte - b'0');
            if index % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum();
    sum % 10 == 0
}
