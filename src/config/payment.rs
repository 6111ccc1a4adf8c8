//! Payment configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key
    pub stripe_api_key: String,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Reject events whose livemode flag differs from the key's mode
    #[serde(default)]
    pub require_livemode: bool,

    /// ISO currency for checkout sessions, lowercase
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Redirect after a completed checkout. May carry `{CHECKOUT_SESSION_ID}`.
    #[serde(default = "default_success_url")]
    pub checkout_success_url: String,

    #[serde(default = "default_cancel_url")]
    pub checkout_cancel_url: String,

    /// Timeout for outbound gateway calls in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Days a processed webhook event is kept for deduplication
    #[serde(default = "default_webhook_retention_days")]
    pub webhook_retention_days: u32,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_live_")
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
        }
        if self.stripe_webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
        }

        // Verify key prefixes for safety
        if !self.stripe_api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !self.stripe_webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }

        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(ValidationError::InvalidCurrency);
        }
        if !is_absolute_url(&self.checkout_success_url) {
            return Err(ValidationError::InvalidCheckoutUrl("checkout_success_url"));
        }
        if !is_absolute_url(&self.checkout_cancel_url) {
            return Err(ValidationError::InvalidCheckoutUrl("checkout_cancel_url"));
        }
        if self.http_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.webhook_retention_days == 0 {
            return Err(ValidationError::InvalidRetention);
        }

        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: String::new(),
            stripe_webhook_secret: String::new(),
            api_base_url: default_api_base_url(),
            require_livemode: false,
            currency: default_currency(),
            checkout_success_url: default_success_url(),
            checkout_cancel_url: default_cancel_url(),
            http_timeout_secs: default_http_timeout(),
            webhook_retention_days: default_webhook_retention_days(),
        }
    }
}

fn is_absolute_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_success_url() -> String {
    "http://localhost:3000/checkout/success?session_id={CHECKOUT_SESSION_ID}".to_string()
}

fn default_cancel_url() -> String {
    "http://localhost:3000/cart".to_string()
}

fn default_http_timeout() -> u64 {
    15
}

fn default_webhook_retention_days() -> u32 {
    30
}
