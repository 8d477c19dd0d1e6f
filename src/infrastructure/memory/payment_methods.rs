use crate::domain::{
    repositories::payment_methods::PaymentMethodRegistry,
    value_objects::payment_methods::PaymentMethodContract,
};

/// Registry filled once at startup. Registration order is the display order.
pub struct PaymentMethodInMemory {
    contracts: Vec<PaymentMethodContract>,
}

impl PaymentMethodInMemory {
    /// Later contracts with an already registered id replace the earlier one in place.
    pub fn new(contracts: Vec<PaymentMethodContract>) -> Self {
        let mut unique: Vec<PaymentMethodContract> = Vec::with_capacity(contracts.len());
        for contract in contracts {
            match unique.iter_mut().find(|existing| existing.id == contract.id) {
                Some(existing) => *existing = contract,
                None => unique.push(contract),
            }
        }
        Self { contracts: unique }
    }
}

impl PaymentMethodRegistry for PaymentMethodInMemory {
    fn list_contracts(&self) -> Vec<PaymentMethodContract> {
        self.contracts.clone()
    }

    fn list_enabled_contracts(&self) -> Vec<PaymentMethodContract> {
        self.contracts
            .iter()
            .filter(|contract| contract.enabled)
            .cloned()
            .collect()
    }

    fn get_contract(&self, method_id: &str) -> Option<PaymentMethodContract> {
        self.contracts
            .iter()
            .find(|contract| contract.id == method_id)
            .cloned()
    }
}
