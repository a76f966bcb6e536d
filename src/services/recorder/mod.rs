//! Persistence of dispatch events behind a small trait.
//!
//! With a configured database the PostgreSQL recorder is used; otherwise the
//! relay keeps events in memory for the life of the process.

mod database;
mod memory;

pub use database::DatabaseEventRecorder;
pub use memory::MemoryEventRecorder;

use async_trait::async_trait;
use jiff::Timestamp;

use crate::error::AppResult;
use crate::models::{EventRecord, StoredEvent};

#[async_trait]
pub trait EventRecorder: Send + Sync {
    /// Persists one event. Never fails: storage errors are logged and
    /// reported as `false` so delivery is never affected.
    async fn record(&self, record: &EventRecord) -> bool;

    /// Most recent events first.
    async fn recent(&self, limit: usize) -> AppResult<Vec<StoredEvent>>;

    /// Events with `start <= recorded_at < end`, oldest first.
    async fn between(&self, start: Timestamp, end: Timestamp) -> AppResult<Vec<StoredEvent>>;

    /// Events with `recorded_at >= start`, oldest first.
    async fn since(&self, start: Timestamp) -> AppResult<Vec<StoredEvent>>;

    /// Removes the events [`between`](Self::between) would return and
    /// returns them.
    async fn purge(&self, start: Timestamp, end: Timestamp) -> AppResult<Vec<StoredEvent>>;

    async fn count(&self) -> AppResult<u64>;

    fn name(&self) -> &'static str;
}
