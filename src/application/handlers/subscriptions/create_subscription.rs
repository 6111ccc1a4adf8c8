//! CreateSubscriptionHandler - Command handler for recurring deliveries.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::{
    DomainError, ErrorCode, ProductId, SubscriptionId, Timestamp, UserId,
};
use crate::domain::order::ShippingAddress;
use crate::domain::subscription::{DeliveryFrequency, Subscription};
use crate::ports::{CreateSubscriptionRequest, PaymentGateway, ProductCatalog, SubscriptionRepository};

/// Command to start a subscription.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionCommand {
    pub user_id: UserId,
    /// The customer's reference at the gateway, if they have one.
    pub gateway_customer_id: Option<String>,
    pub product_id: ProductId,
    pub frequency: DeliveryFrequency,
    pub quantity: u32,
    pub shipping_address: ShippingAddress,
}

#[derive(Debug, Clone)]
pub struct CreateSubscriptionResult {
    pub subscription: Subscription,
    /// Lets the client pay the first invoice.
    pub client_secret: Option<String>,
}

/// Handler for creating subscriptions.
///
/// The gateway agreement is created first with incomplete-payment
/// behaviour; the local record follows with the returned reference.
pub struct CreateSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    catalog: Arc<dyn ProductCatalog>,
    gateway: Arc<dyn PaymentGateway>,
}

impl CreateSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        catalog: Arc<dyn ProductCatalog>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            subscriptions,
            catalog,
            gateway,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateSubscriptionCommand,
    ) -> Result<CreateSubscriptionResult, DomainError> {
        // 1. Validate input
        if cmd.quantity == 0 {
            return Err(DomainError::validation("quantity", "Quantity must be at least 1"));
        }
        cmd.shipping_address.validate()?;

        // 2. Product must be active and billable
        let product = self.catalog.find_by_id(&cmd.product_id).await?;
        let price_id = product
            .filter(|p| p.is_active)
            .and_then(|p| p.gateway_price_id)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::ProductUnavailable, "Product not found or inactive")
                    .with_detail("product_id", cmd.product_id.to_string())
            })?;

        // 3. Customer must be known to the gateway
        let customer_id = cmd
            .gateway_customer_id
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                DomainError::validation(
                    "customer",
                    "Payment customer not found. Please contact support.",
                )
            })?;

        // 4. Create the billing agreement
        let gateway_subscription = self
            .gateway
            .create_subscription(CreateSubscriptionRequest {
                customer_id,
                price_id,
                quantity: cmd.quantity,
                metadata: HashMap::from([
                    ("user_id".to_string(), cmd.user_id.to_string()),
                    ("product_id".to_string(), cmd.product_id.to_string()),
                    ("frequency".to_string(), cmd.frequency.to_string()),
                ]),
            })
            .await
            .map_err(|err| {
                tracing::error!(
                    user_id = %cmd.user_id,
                    product_id = %cmd.product_id,
                    error = %err,
                    "Gateway subscription creation failed"
                );
                DomainError::from(err)
            })?;

        // 5. Persist locally
        let subscription = Subscription::start(
            SubscriptionId::new(),
            cmd.user_id,
            cmd.product_id,
            cmd.frequency,
            cmd.quantity,
            gateway_subscription.id.clone(),
            cmd.shipping_address,
            Timestamp::now(),
        )?;
        self.subscriptions.save(&subscription).await?;

        tracing::info!(
            subscription_id = %subscription.id,
            gateway_subscription_id = %subscription.gateway_subscription_id,
            frequency = %subscription.frequency,
            "Subscription created"
        );

        Ok(CreateSubscriptionResult {
            subscription,
            client_secret: gateway_subscription.client_secret,
        })
    }
}
