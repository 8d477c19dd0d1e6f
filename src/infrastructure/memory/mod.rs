pub mod payment_intents;
pub mod payment_methods;
