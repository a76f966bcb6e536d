use async_trait::async_trait;
use jiff::Timestamp;

use super::EventRecorder;
use crate::error::AppResult;
use crate::models::{EventRecord, StoredEvent};
use crate::repositories::EventRepository;

pub struct DatabaseEventRecorder {
    events: EventRepository,
}

impl DatabaseEventRecorder {
    pub fn new(events: EventRepository) -> Self {
        Self { events }
    }
}

#[async_trait]
impl EventRecorder for DatabaseEventRecorder {
    async fn record(&self, record: &EventRecord) -> bool {
        match self.events.create(record).await {
            Ok(stored) => {
                tracing::debug!(event_id = stored.id, bucket = %stored.record.bucket, "Event recorded");
                true
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    sender = %record.sender,
                    bucket = %record.bucket,
                    "Failed to record event"
                );
                false
            }
        }
    }

    async fn recent(&self, limit: usize) -> AppResult<Vec<StoredEvent>> {
        self.events
            .recent(i64::try_from(limit).unwrap_or(i64::MAX))
            .await
    }

    async fn between(&self, start: Timestamp, end: Timestamp) -> AppResult<Vec<StoredEvent>> {
        self.events.in_range(start, end).await
    }

    async fn since(&self, start: Timestamp) -> AppResult<Vec<StoredEvent>> {
        self.events.since(start).await
    }

    async fn purge(&self, start: Timestamp, end: Timestamp) -> AppResult<Vec<StoredEvent>> {
        let removed = self.events.delete_in_range(start, end).await?;
        tracing::info!(removed = removed.len(), %start, %end, "Purged events");
        Ok(removed)
    }

    async fn count(&self) -> AppResult<u64> {
        let count = self.events.count().await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
