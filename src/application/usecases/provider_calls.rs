use std::{future::Future, time::Duration};

use tracing::{error, warn};

use crate::{
    application::usecases::payment_errors::{PaymentError, UseCaseResult},
    domain::{
        providers::{ProviderError, ProviderOperation, ProviderResult},
        value_objects::payment_results::PaymentResult,
    },
};

/// Runs one provider operation under `timeout`.
///
/// Declines become a failed [`PaymentResult`] tied to `external_id`; everything
/// else the provider reports is returned as a [`PaymentError`].
pub(crate) async fn call_provider<F>(
    provider: &'static str,
    operation: ProviderOperation,
    timeout: Duration,
    external_id: Option<String>,
    call: F,
) -> UseCaseResult<PaymentResult>
where
    F: Future<Output = ProviderResult>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(ProviderError::Declined(reason))) => {
            warn!(provider, %operation, %reason, "payments: provider declined operation");
            Ok(PaymentResult::failed_for(external_id, reason))
        }
        Ok(Err(ProviderError::UnsupportedOperation {
            provider,
            operation,
        })) => Err(PaymentError::UnsupportedOperation {
            provider,
            operation,
        }),
        Ok(Err(ProviderError::Unavailable(reason))) => {
            error!(provider, %operation, %reason, "payments: provider unavailable");
            Err(PaymentError::Provider(reason))
        }
        Err(_) => {
            error!(provider, %operation, timeout_ms = timeout.as_millis() as u64, "payments: provider call timed out");
            Err(PaymentError::Provider(format!(
                "{provider} did not answer {operation} within {}ms",
                timeout.as_millis()
            )))
        }
    }
}
