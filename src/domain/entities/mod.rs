pub mod payment_intents;
pub mod saved_payment_methods;
