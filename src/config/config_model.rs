use std::time::Duration;

use crate::config::stage::Stage;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub payments: Payments,
    pub stage: Stage,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    /// MiB
    pub body_limit: u64,
    /// Seconds
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Payments {
    /// Card payments are only offered when a key is present.
    pub stripe_secret_key: Option<String>,
    pub upi_merchant_vpa: String,
    pub disabled_methods: Vec<String>,
    pub provider_timeout_secs: u64,
}

impl Payments {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn is_disabled(&self, method_id: &str) -> bool {
        self.disabled_methods.iter().any(|disabled| disabled == method_id)
    }
}

impl Default for Payments {
    fn default() -> Self {
        Self {
            stripe_secret_key: None,
            upi_merchant_vpa: "grocer@upi".to_string(),
            disabled_methods: Vec::new(),
            provider_timeout_secs: 10,
        }
    }
}
