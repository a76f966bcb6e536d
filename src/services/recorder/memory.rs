use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::RwLock;

use super::EventRecorder;
use crate::error::AppResult;
use crate::models::{EventRecord, StoredEvent};

#[derive(Debug, Default)]
struct Store {
    next_id: i64,
    events: Vec<StoredEvent>,
}

/// Process-local recorder used when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryEventRecorder {
    store: RwLock<Store>,
}

impl MemoryEventRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

fn in_window(event: &StoredEvent, start: Timestamp, end: Timestamp) -> bool {
    let at = event.record.recorded_at;
    start <= at && at < end
}

#[async_trait]
impl EventRecorder for MemoryEventRecorder {
    async fn record(&self, record: &EventRecord) -> bool {
        let mut store = self.store.write().await;
        store.next_id += 1;
        let id = store.next_id;
        store.events.push(StoredEvent::new(id, record.clone()));
        tracing::debug!(event_id = id, bucket = %record.bucket, "Event recorded in memory");
        true
    }

    async fn recent(&self, limit: usize) -> AppResult<Vec<StoredEvent>> {
        let store = self.store.read().await;
        let mut events = store.events.clone();
        events.sort_by(|a, b| {
            b.record
                .recorded_at
                .cmp(&a.record.recorded_at)
                .then(b.id.cmp(&a.id))
        });
        events.truncate(limit);
        Ok(events)
    }

    async fn between(&self, start: Timestamp, end: Timestamp) -> AppResult<Vec<StoredEvent>> {
        let store = self.store.read().await;
        let mut events: Vec<StoredEvent> = store
            .events
            .iter()
            .filter(|e| in_window(e, start, end))
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.record.recorded_at, e.id));
        Ok(events)
    }

    async fn since(&self, start: Timestamp) -> AppResult<Vec<StoredEvent>> {
        self.between(start, Timestamp::MAX).await
    }

    async fn purge(&self, start: Timestamp, end: Timestamp) -> AppResult<Vec<StoredEvent>> {
        let mut store = self.store.write().await;
        let (mut removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut store.events)
            .into_iter()
            .partition(|e| in_window(e, start, end));
        store.events = kept;
        removed.sort_by_key(|e| (e.record.recorded_at, e.id));
        tracing::info!(removed = removed.len(), %start, %end, "Purged in-memory events");
        Ok(removed)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.store.read().await.events.len() as u64)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
