//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` port against the Stripe REST API.
//! Requests are form-encoded and authenticated with the secret key as the
//! basic-auth username.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key).with_timeout(Duration::from_secs(10));
//! let gateway = StripePaymentGateway::new(config)?;
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, CreateSubscriptionRequest, GatewaySubscription,
    PaymentError, PaymentErrorCode, PaymentGateway,
};

use super::api_types::{StripeCheckoutSession, StripeErrorBody, StripeSubscription};

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Per-request timeout for outbound calls.
    timeout: Duration,
}

impl StripeConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Stripe-backed `PaymentGateway`.
pub struct StripePaymentGateway {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentGateway {
    pub fn new(config: StripeConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    /// Sends a prepared request and decodes a 2xx body as `T`.
    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        operation: &'static str,
    ) -> Result<T, PaymentError> {
        let response = request
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(operation, error = %e, "Stripe request failed");
                PaymentError::network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = error_from_response(status.as_u16(), &body);
            tracing::error!(
                operation,
                status = status.as_u16(),
                provider_code = ?error.provider_code,
                "Stripe API returned an error"
            );
            return Err(error);
        }

        response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

#[async_trait]
impl PaymentGateway for StripePaymentGateway {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let params = checkout_form(&request);
        let session: StripeCheckoutSession = self
            .send(
                self.http_client
                    .post(self.url("/v1/checkout/sessions"))
                    .form(&params),
                "create_checkout_session",
            )
            .await?;

        let url = session
            .url
            .ok_or_else(|| PaymentError::provider("Checkout session has no payment URL"))?;

        tracing::debug!(session_id = %session.id, "Created checkout session");
        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<GatewaySubscription, PaymentError> {
        let params = subscription_form(&request);
        let sub: StripeSubscription = self
            .send(
                self.http_client
                    .post(self.url("/v1/subscriptions"))
                    .form(&params),
                "create_subscription",
            )
            .await?;

        tracing::debug!(subscription_id = %sub.id, status = %sub.status, "Created subscription");
        Ok(into_gateway_subscription(sub))
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        at_period_end: bool,
    ) -> Result<GatewaySubscription, PaymentError> {
        let url = self.url(&format!("/v1/subscriptions/{}", subscription_id));

        let request = if at_period_end {
            self.http_client
                .post(&url)
                .form(&[("cancel_at_period_end", "true")])
        } else {
            self.http_client.delete(&url)
        };

        let sub: StripeSubscription = self.send(request, "cancel_subscription").await?;
        Ok(into_gateway_subscription(sub))
    }
}

fn into_gateway_subscription(sub: StripeSubscription) -> GatewaySubscription {
    let client_secret = sub.client_secret();
    GatewaySubscription {
        id: sub.id,
        status: sub.status,
        cancel_at_period_end: sub.cancel_at_period_end,
        client_secret,
    }
}

/// Form parameters for a one-off payment checkout session.
fn checkout_form(request: &CreateCheckoutRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("mode".to_string(), "payment".to_string()),
        ("customer_email".to_string(), request.customer_email.clone()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];

    for (i, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{}]", i);
        params.push((
            format!("{}[price_data][currency]", prefix),
            request.currency.clone(),
        ));
        params.push((
            format!("{}[price_data][unit_amount]", prefix),
            item.unit_amount.cents().to_string(),
        ));
        params.push((
            format!("{}[price_data][product_data][name]", prefix),
            item.name.clone(),
        ));
        params.push((format!("{}[quantity]", prefix), item.quantity.to_string()));
    }

    push_metadata(&mut params, "metadata", &request.metadata);
    params
}

/// Form parameters for an incomplete-payment subscription.
fn subscription_form(request: &CreateSubscriptionRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("customer".to_string(), request.customer_id.clone()),
        ("items[0][price]".to_string(), request.price_id.clone()),
        ("items[0][quantity]".to_string(), request.quantity.to_string()),
        (
            "payment_behavior".to_string(),
            "default_incomplete".to_string(),
        ),
        (
            "payment_settings[save_default_payment_method]".to_string(),
            "on_subscription".to_string(),
        ),
        (
            "expand[]".to_string(),
            "latest_invoice.payment_intent".to_string(),
        ),
    ];
    push_metadata(&mut params, "metadata", &request.metadata);
    params
}

fn push_metadata(
    params: &mut Vec<(String, String)>,
    key: &str,
    metadata: &std::collections::HashMap<String, String>,
) {
    let mut entries: Vec<_> = metadata.iter().collect();
    entries.sort();
    for (k, v) in entries {
        params.push((format!("{}[{}]", key, k), v.clone()));
    }
}

fn error_from_response(status: u16, body: &str) -> PaymentError {
    let code = PaymentErrorCode::from_http_status(status);
    match serde_json::from_str::<StripeErrorBody>(body) {
        Ok(parsed) => {
            let message = parsed
                .error
                .message
                .unwrap_or_else(|| format!("Stripe API error ({})", status));
            let error = PaymentError::new(code, message);
            match parsed.error.code.or(parsed.error.error_type) {
                Some(provider_code) => error.with_provider_code(provider_code),
                None => error,
            }
        }
        Err(_) => PaymentError::new(code, format!("Stripe API error ({})", status)),
    }
}
