use crate::domain::value_objects::payment_methods::PaymentMethodContract;

#[cfg_attr(test, mockall::automock)]
pub trait PaymentMethodRegistry: Send + Sync {
    /// Every registered contract, enabled or not, in registration order.
    fn list_contracts(&self) -> Vec<PaymentMethodContract>;

    fn list_enabled_contracts(&self) -> Vec<PaymentMethodContract>;

    fn get_contract(&self, method_id: &str) -> Option<PaymentMethodContract>;
}
