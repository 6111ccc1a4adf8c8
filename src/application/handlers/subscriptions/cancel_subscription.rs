//! CancelSubscriptionHandler - Command handler for customer cancellation.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, UserId};
use crate::domain::subscription::{Subscription, SubscriptionStatus};
use crate::ports::{PaymentGateway, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub subscription_id: SubscriptionId,
    pub user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct CancelSubscriptionResult {
    pub subscription: Subscription,
    /// True when the subscription was already cancelled.
    pub already_cancelled: bool,
}

/// Handler for cancelling subscriptions.
///
/// Billing stops at the end of the current period; the local record is
/// cancelled right away. Repeating a cancellation is a no-op.
pub struct CancelSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl CancelSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            subscriptions,
            gateway,
        }
    }

    pub async fn handle(
        &self,
        cmd: CancelSubscriptionCommand,
    ) -> Result<CancelSubscriptionResult, DomainError> {
        // 1. Find and authorize
        let mut subscription = self
            .subscriptions
            .find_by_id(&cmd.subscription_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::SubscriptionNotFound, "Subscription not found")
            })?;

        if !subscription.is_owned_by(&cmd.user_id) {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Not allowed to modify this subscription",
            ));
        }

        if subscription.status == SubscriptionStatus::Cancelled {
            return Ok(CancelSubscriptionResult {
                subscription,
                already_cancelled: true,
            });
        }

        // 2. Stop billing at period end
        self.gateway
            .cancel_subscription(&subscription.gateway_subscription_id, true)
            .await
            .map_err(|err| {
                tracing::error!(
                    subscription_id = %subscription.id,
                    error = %err,
                    "Gateway cancellation failed"
                );
                DomainError::from(err)
            })?;

        // 3. Cancel locally unless a gateway deletion got there first
        let previous = subscription.status;
        subscription.cancel();
        if !self.subscriptions.update_if_status(&subscription, previous).await? {
            let current = self
                .subscriptions
                .find_by_id(&subscription.id)
                .await?
                .ok_or_else(|| {
                    DomainError::new(ErrorCode::SubscriptionNotFound, "Subscription not found")
                })?;
            return Ok(CancelSubscriptionResult {
                already_cancelled: current.status == SubscriptionStatus::Cancelled,
                subscription: current,
            });
        }

        tracing::info!(subscription_id = %subscription.id, "Subscription cancelled by customer");

        Ok(CancelSubscriptionResult {
            subscription,
            already_cancelled: false,
        })
    }
}
