//! PurgeWebhookEventsHandler - drops processed-event records past retention.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::foundation::DomainError;
use crate::ports::WebhookEventRepository;

pub struct PurgeWebhookEventsHandler {
    events: Arc<dyn WebhookEventRepository>,
    retention_days: u32,
}

impl PurgeWebhookEventsHandler {
    pub fn new(events: Arc<dyn WebhookEventRepository>, retention_days: u32) -> Self {
        Self {
            events,
            retention_days,
        }
    }

    /// Deletes records processed before the retention window. Returns the count.
    pub async fn handle(&self) -> Result<u64, DomainError> {
        let cutoff = Utc::now() - Duration::days(i64::from(self.retention_days));
        let deleted = self.events.delete_before(cutoff).await?;
        tracing::info!(
            deleted,
            retention_days = self.retention_days,
            "Purged processed webhook events"
        );
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryWebhookEventRepository;
    use crate::ports::{RecordedOutcome, WebhookEventRecord};

    fn record(event_id: &str, age_days: i64) -> WebhookEventRecord {
        let mut record = WebhookEventRecord::new(
            event_id,
            "checkout.session.completed",
            RecordedOutcome::Applied,
            None,
            serde_json::Value::Null,
        );
        record.processed_at = Utc::now() - Duration::days(age_days);
        record
    }

    #[tokio::test]
    async fn removes_only_records_older_than_retention() {
        let repo = Arc::new(InMemoryWebhookEventRepository::new());
        repo.save(record("evt_old", 45)).await.unwrap();
        repo.save(record("evt_recent", 3)).await.unwrap();

        let deleted = PurgeWebhookEventsHandler::new(repo.clone(), 30)
            .handle()
            .await
            .unwrap();

        assert_eq!(deleted, 1);
        assert!(repo.find_by_event_id("evt_old").await.unwrap().is_none());
        assert!(repo.find_by_event_id("evt_recent").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn empty_store_purges_nothing() {
        let repo = Arc::new(InMemoryWebhookEventRepository::new());
        let deleted = PurgeWebhookEventsHandler::new(repo, 30).handle().await.unwrap();
        assert_eq!(deleted, 0);
    }
}
