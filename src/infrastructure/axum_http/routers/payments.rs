use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{
    application::usecases::payment_errors::{PaymentError, UseCaseResult},
    composition::PaymentContext,
    domain::{
        repositories::{
            payment_intents::PaymentIntentRepository, payment_methods::PaymentMethodRegistry,
        },
        value_objects::payments::{
            CapturePaymentModel, DEFAULT_CURRENCY, PaymentFields, PaymentOutcome,
            ProcessPaymentModel, RefundPaymentModel,
        },
    },
    infrastructure::axum_http::error_responses::{success, success_with_count},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentRequest {
    pub method_id: Option<String>,
    pub amount: Option<Value>,
    pub currency: Option<String>,
    pub fields: Option<PaymentFields>,
    pub order_id: Option<String>,
    pub customer_id: Option<String>,
    pub metadata: Option<PaymentFields>,
    pub save_method: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturePaymentRequest {
    pub intent_id: Option<String>,
    pub amount: Option<Value>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundPaymentRequest {
    pub payment_id: Option<String>,
    pub amount: Option<Value>,
    pub currency: Option<String>,
    pub reason: Option<String>,
}

pub fn routes(context: Arc<PaymentContext>) -> Router {
    Router::new()
        .route("/methods", get(list_methods))
        .route("/methods/:method_id", get(get_method))
        .route("/process", post(process_payment))
        .route("/capture", post(capture_payment))
        .route("/refund", post(refund_payment))
        .route("/intents/:intent_id", get(get_intent))
        .route("/orders/:order_id/intents", get(list_order_intents))
        .route("/customers/:customer_id/methods", get(list_saved_methods))
        .with_state(context)
}

pub async fn list_methods(State(context): State<Arc<PaymentContext>>) -> impl IntoResponse {
    let methods = context.method_registry().list_enabled_contracts();
    let count = methods.len();
    success_with_count(json!({ "methods": methods }), count)
}

pub async fn get_method(
    State(context): State<Arc<PaymentContext>>,
    Path(method_id): Path<String>,
) -> impl IntoResponse {
    match context.method_registry().get_contract(&method_id) {
        Some(contract) => success(json!({ "contract": contract })),
        None => PaymentError::NotFound(format!("Payment method {method_id} not found"))
            .into_response(),
    }
}

pub async fn process_payment(
    State(context): State<Arc<PaymentContext>>,
    payload: Result<Json<ProcessPaymentRequest>, JsonRejection>,
) -> Response {
    let result = match payload {
        Ok(Json(request)) => process(&context, request).await,
        Err(rejection) => Err(PaymentError::Validation(rejection.body_text())),
    };
    respond(result)
}

pub async fn capture_payment(
    State(context): State<Arc<PaymentContext>>,
    payload: Result<Json<CapturePaymentRequest>, JsonRejection>,
) -> Response {
    let result = match payload {
        Ok(Json(request)) => capture(&context, request).await,
        Err(rejection) => Err(PaymentError::Validation(rejection.body_text())),
    };
    respond(result)
}

pub async fn refund_payment(
    State(context): State<Arc<PaymentContext>>,
    payload: Result<Json<RefundPaymentRequest>, JsonRejection>,
) -> Response {
    let result = match payload {
        Ok(Json(request)) => refund(&context, request).await,
        Err(rejection) => Err(PaymentError::Validation(rejection.body_text())),
    };
    respond(result)
}

pub async fn get_intent(
    State(context): State<Arc<PaymentContext>>,
    Path(intent_id): Path<String>,
) -> Response {
    match context.find_intent(&intent_id).await {
        Ok(intent) => success(json!({ "intent": intent })),
        Err(err) => err.into_response(),
    }
}

pub async fn list_order_intents(
    State(context): State<Arc<PaymentContext>>,
    Path(order_id): Path<String>,
) -> Response {
    match context.payment_intent_repo().list_by_order(&order_id).await {
        Ok(intents) => {
            let count = intents.len();
            success_with_count(json!({ "intents": intents }), count)
        }
        Err(err) => PaymentError::Internal(err).into_response(),
    }
}

pub async fn list_saved_methods(
    State(context): State<Arc<PaymentContext>>,
    Path(customer_id): Path<String>,
) -> Response {
    match context
        .payment_intent_repo()
        .list_payment_methods(&customer_id)
        .await
    {
        Ok(methods) => {
            let count = methods.len();
            success_with_count(json!({ "methods": methods }), count)
        }
        Err(err) => PaymentError::Internal(err).into_response(),
    }
}

async fn process(
    context: &PaymentContext,
    request: ProcessPaymentRequest,
) -> UseCaseResult<PaymentOutcome> {
    let method_id = required_text(request.method_id, "methodId")?;
    let amount = required_amount(request.amount.as_ref())?;
    let order_id = required_text(request.order_id, "orderId")?;

    // Unknown or switched-off methods are client errors, not wiring errors.
    match context.method_registry().get_contract(&method_id) {
        Some(contract) if contract.enabled => {}
        Some(_) => {
            return Err(PaymentError::Validation(format!(
                "Payment method {method_id} is disabled"
            )));
        }
        None => {
            return Err(PaymentError::Validation(format!(
                "Unknown payment method {method_id}"
            )));
        }
    }

    info!(%method_id, %order_id, amount, "payments: process route invoked");
    let use_case = context.process_payment_use_case(&method_id)?;
    use_case
        .execute(ProcessPaymentModel {
            method_id,
            amount,
            currency: request
                .currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            fields: request.fields.unwrap_or_default(),
            order_id,
            customer_id: request.customer_id.filter(|id| !id.trim().is_empty()),
            metadata: request.metadata.unwrap_or_default(),
            save_method: request.save_method.unwrap_or(false),
        })
        .await
}

async fn capture(
    context: &PaymentContext,
    request: CapturePaymentRequest,
) -> UseCaseResult<PaymentOutcome> {
    let intent_id = required_text(request.intent_id, "intentId")?;
    let use_case = context.capture_use_case_for_intent(&intent_id).await?;
    let amount = required_amount(request.amount.as_ref())?;

    info!(%intent_id, amount, "payments: capture route invoked");
    use_case
        .execute(CapturePaymentModel {
            intent_id,
            amount,
            currency: request.currency,
        })
        .await
}

async fn refund(
    context: &PaymentContext,
    request: RefundPaymentRequest,
) -> UseCaseResult<PaymentOutcome> {
    let payment_id = required_text(request.payment_id, "paymentId")?;
    let use_case = context.refund_use_case_for_payment(&payment_id).await?;
    let amount = required_amount(request.amount.as_ref())?;

    info!(%payment_id, amount, "payments: refund route invoked");
    use_case
        .execute(RefundPaymentModel {
            payment_id,
            amount,
            currency: request.currency,
            reason: request.reason,
        })
        .await
}

fn respond(result: UseCaseResult<PaymentOutcome>) -> Response {
    match result {
        Ok(outcome) => success(outcome),
        Err(err) => err.into_response(),
    }
}

fn required_text(value: Option<String>, name: &str) -> UseCaseResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PaymentError::Validation(format!("{name} is required")))
}

/// Amounts travel as integers in the smallest currency unit.
fn required_amount(value: Option<&Value>) -> UseCaseResult<i64> {
    let value = value
        .filter(|v| !v.is_null())
        .ok_or_else(|| PaymentError::Validation("amount is required".to_string()))?;
    value.as_i64().ok_or_else(|| {
        PaymentError::Validation(
            "amount must be an integer in the smallest currency unit".to_string(),
        )
    })
}
