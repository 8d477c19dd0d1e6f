use anyhow::Result;
use grocery_payments::{
    composition::PaymentContext,
    config::config_loader,
    domain::clock::{RandomIdGenerator, SystemClock},
    infrastructure::axum_http::http_serve,
    observability,
};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Payments exited with error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    observability::init_observability("payments")?;

    let dotenvy_env = config_loader::load()?;
    info!(stage = %dotenvy_env.stage, "ENV has been loaded");

    let context = PaymentContext::from_config(
        &dotenvy_env.payments,
        Arc::new(SystemClock),
        Arc::new(RandomIdGenerator),
    );

    http_serve::start(Arc::new(dotenvy_env), Arc::new(context)).await?;

    Ok(())
}
