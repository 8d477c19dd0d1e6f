use anyhow::{Context, Result};

use crate::config::{
    config_model::{DotEnvyConfig, Payments, Server},
    stage::Stage,
};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    load_from(|key| std::env::var(key).ok())
}

/// Builds the config from any key lookup; `load` passes the process env.
pub fn load_from<F>(lookup: F) -> Result<DotEnvyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let value = |key: &str, default: &str| {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    let server = Server {
        port: value("SERVER_PORT", "8080")
            .parse()
            .context("SERVER_PORT is invalid")?,
        body_limit: value("SERVER_BODY_LIMIT", "1")
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: value("SERVER_TIMEOUT", "30")
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let defaults = Payments::default();
    let provider_timeout_secs: u64 = value(
        "PAYMENT_PROVIDER_TIMEOUT_SECS",
        &defaults.provider_timeout_secs.to_string(),
    )
    .parse()
    .context("PAYMENT_PROVIDER_TIMEOUT_SECS is invalid")?;
    if provider_timeout_secs == 0 {
        anyhow::bail!("PAYMENT_PROVIDER_TIMEOUT_SECS must be greater than zero");
    }

    let payments = Payments {
        stripe_secret_key: lookup("STRIPE_SECRET_KEY").and_then(|v| {
            let trimmed = v.trim().to_string();
            (!trimmed.is_empty()).then_some(trimmed)
        }),
        upi_merchant_vpa: value("UPI_MERCHANT_VPA", &defaults.upi_merchant_vpa),
        disabled_methods: value("PAYMENT_DISABLED_METHODS", "")
            .split(',')
            .map(|method| method.trim().to_ascii_lowercase())
            .filter(|method| !method.is_empty())
            .collect(),
        provider_timeout_secs,
    };

    let stage = Stage::try_from(&value("STAGE", "")).unwrap_or_default();

    Ok(DotEnvyConfig {
        server,
        payments,
        stage,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or("".to_string());
    Stage::try_from(&stage_str).unwrap_or_default()
}
