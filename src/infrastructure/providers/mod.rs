pub mod cash_on_delivery;
pub mod stripe;
pub mod upi;
