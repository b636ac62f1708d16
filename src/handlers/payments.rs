use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::PaymentGateway;
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaymentIntentRequest {
    /// Amount in major currency units, e.g. 25.0 for $25.00.
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "usd".to_string()
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentResponse {
    pub client_secret: String,
}

/// POST /api/create-payment-intent
///
/// Brokers a payment intent with the provider and hands the client secret
/// back so the browser can collect payment directly. Card data never passes
/// through this service.
#[utoipa::path(
    post,
    path = "/api/create-payment-intent",
    request_body = CreatePaymentIntentRequest,
    responses(
        (status = 200, description = "Intent created", body = CreatePaymentIntentResponse),
        (status = 400, description = "Invalid amount"),
        (status = 502, description = "Payment provider failure"),
    ),
    tag = "payments"
)]
pub async fn create_payment_intent(
    gateway: web::Data<dyn PaymentGateway>,
    body: web::Json<CreatePaymentIntentRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let amount = BigDecimal::try_from(body.amount)
        .map_err(|e| AppError::BadRequest(format!("Invalid amount '{}': {}", body.amount, e)))?;
    let intent = gateway.create_intent(amount, &body.currency).await?;
    Ok(HttpResponse::Ok().json(CreatePaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}
