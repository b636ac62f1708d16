use std::time::Duration;

use async_trait::async_trait;
use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};
use serde::Deserialize;

use crate::domain::errors::DomainError;
use crate::domain::payment::PaymentIntentView;
use crate::domain::ports::PaymentGateway;

const API_BASE: &str = "https://api.stripe.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Payment gateway backed by the Stripe payment-intents API. Card data never
/// touches this service; the client secret returned from `create_intent` lets
/// the browser collect payment directly with the provider.
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl StripeGateway {
    pub fn new(secret_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build payment gateway HTTP client");
        Self {
            client,
            secret_key,
            api_base: API_BASE.to_string(),
        }
    }

    async fn parse_intent(resp: reqwest::Response) -> Result<PaymentIntentView, DomainError> {
        if resp.status().is_success() {
            let intent: IntentResponse = resp
                .json()
                .await
                .map_err(|e| DomainError::Gateway(e.to_string()))?;
            Ok(PaymentIntentView {
                id: intent.id,
                client_secret: intent.client_secret,
                status: intent.status,
            })
        } else {
            let status = resp.status();
            // Pass the provider's message through when it sends one.
            let message = match resp.json::<ErrorResponse>().await {
                Ok(body) => body.error.message,
                Err(_) => format!("Payment provider returned {}", status),
            };
            Err(DomainError::Gateway(message))
        }
    }
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    id: String,
    client_secret: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Convert a major-unit decimal amount to the provider's minor-unit integer,
/// rounding to the nearest cent.
pub fn to_minor_units(amount: &BigDecimal) -> Result<i64, DomainError> {
    (amount * BigDecimal::from(100))
        .with_scale_round(0, RoundingMode::HalfUp)
        .to_i64()
        .ok_or_else(|| DomainError::InvalidInput(format!("Amount out of range: {}", amount)))
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        amount: BigDecimal,
        currency: &str,
    ) -> Result<PaymentIntentView, DomainError> {
        let cents = to_minor_units(&amount)?;
        let params = [
            ("amount", cents.to_string()),
            ("currency", currency.to_string()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
        ];
        let resp = self
            .client
            .post(format!("{}/payment_intents", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await
            .map_err(|e| DomainError::Gateway(e.to_string()))?;
        Self::parse_intent(resp).await
    }

    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntentView, DomainError> {
        let resp = self
            .client
            .get(format!("{}/payment_intents/{}", self.api_base, id))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await
            .map_err(|e| DomainError::Gateway(e.to_string()))?;
        Self::parse_intent(resp).await
    }
}
