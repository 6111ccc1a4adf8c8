//! In-memory SubscriptionRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId};
use crate::domain::subscription::{Subscription, SubscriptionStatus};
use crate::ports::SubscriptionRepository;

#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut subscriptions = self.subscriptions.write().await;
        if subscriptions
            .values()
            .any(|s| s.gateway_subscription_id == subscription.gateway_subscription_id)
        {
            return Err(DomainError::validation(
                "gateway_subscription_id",
                "Recurring billing reference already in use",
            ));
        }
        subscriptions.insert(subscription.id, subscription.clone());
        Ok(())
    }

    async fn update_if_status(
        &self,
        subscription: &Subscription,
        expected: SubscriptionStatus,
    ) -> Result<bool, DomainError> {
        let mut subscriptions = self.subscriptions.write().await;
        match subscriptions.get_mut(&subscription.id) {
            Some(stored) if stored.status == expected => {
                *stored = subscription.clone();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                "Subscription not found",
            )),
        }
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        Ok(self.subscriptions.read().await.get(id).cloned())
    }

    async fn find_by_gateway_id(
        &self,
        gateway_subscription_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .subscriptions
            .read()
            .await
            .values()
            .find(|s| s.gateway_subscription_id == gateway_subscription_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::{test_subscription, DeliveryFrequency};

    #[tokio::test]
    async fn finds_by_gateway_reference() {
        let repo = InMemorySubscriptionRepository::new();
        let sub = test_subscription(DeliveryFrequency::Weekly, "sub_abc");
        repo.save(&sub).await.unwrap();

        let found = repo.find_by_gateway_id("sub_abc").await.unwrap().unwrap();
        assert_eq!(found.id, sub.id);
        assert!(repo.find_by_gateway_id("sub_other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_duplicate_gateway_reference() {
        let repo = InMemorySubscriptionRepository::new();
        repo.save(&test_subscription(DeliveryFrequency::Weekly, "sub_abc"))
            .await
            .unwrap();
        let result = repo
            .save(&test_subscription(DeliveryFrequency::Monthly, "sub_abc"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn update_if_status_refuses_stale_snapshot() {
        let repo = InMemorySubscriptionRepository::new();
        let sub = test_subscription(DeliveryFrequency::Weekly, "sub_abc");
        repo.save(&sub).await.unwrap();

        let stale = sub.clone();
        let mut cancelled = sub.clone();
        cancelled.cancel();
        assert!(repo
            .update_if_status(&cancelled, SubscriptionStatus::Active)
            .await
            .unwrap());

        assert!(!repo
            .update_if_status(&stale, SubscriptionStatus::Active)
            .await
            .unwrap());
        let stored = repo.find_by_id(&sub.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Cancelled);
    }

    #[tokio::test]
    async fn update_if_status_on_missing_subscription_fails() {
        let repo = InMemorySubscriptionRepository::new();
        let sub = test_subscription(DeliveryFrequency::Weekly, "sub_abc");
        let err = repo
            .update_if_status(&sub, SubscriptionStatus::Active)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SubscriptionNotFound);
    }
}
