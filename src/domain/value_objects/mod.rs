pub mod enums;
pub mod payment_methods;
pub mod payment_results;
pub mod payments;
