pub mod capture_payment;
mod intent_claims;
pub mod payment_errors;
pub mod process_payment;
mod provider_calls;
pub mod refund_payment;
