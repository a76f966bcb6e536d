//! Pressure event repository for async database operations.
//!
//! Rows are append-only; the only delete path is the bounded purge used by
//! the admin API.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff::Timestamp;
use jiff_diesel::ToDiesel;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{EventRecord, PressureEventRow, StoredEvent};

#[derive(Clone)]
pub struct EventRepository {
    pool: AsyncDbPool,
}

impl EventRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Inserts one event and returns it with its generated id.
    pub async fn create(&self, record: &EventRecord) -> AppResult<StoredEvent> {
        use crate::schema::pressure_events::dsl::*;

        let new_row = record.to_new_row().map_err(|e| AppError::Internal {
            source: anyhow::Error::from(e),
        })?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AppError::ConnectionPool {
                source: anyhow::Error::from(e),
            })?;

        let row = diesel::insert_into(pressure_events)
            .values(&new_row)
            .returning(PressureEventRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)?;

        to_stored(row)
    }

    /// Newest events first.
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<StoredEvent>> {
        use crate::schema::pressure_events::dsl::*;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AppError::ConnectionPool {
                source: anyhow::Error::from(e),
            })?;

        let rows = pressure_events
            .order(recorded_at.desc())
            .limit(limit)
            .select(PressureEventRow::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)?;

        rows.into_iter().map(to_stored).collect()
    }

    /// Events with `start <= recorded_at < end`, oldest first.
    pub async fn in_range(&self, start: Timestamp, end: Timestamp) -> AppResult<Vec<StoredEvent>> {
        use crate::schema::pressure_events::dsl::*;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AppError::ConnectionPool {
                source: anyhow::Error::from(e),
            })?;

        let rows = pressure_events
            .filter(recorded_at.ge(start.to_diesel()))
            .filter(recorded_at.lt(end.to_diesel()))
            .order(recorded_at.asc())
            .select(PressureEventRow::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)?;

        rows.into_iter().map(to_stored).collect()
    }

    /// Events recorded at or after `start`, oldest first.
    pub async fn since(&self, start: Timestamp) -> AppResult<Vec<StoredEvent>> {
        use crate::schema::pressure_events::dsl::*;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AppError::ConnectionPool {
                source: anyhow::Error::from(e),
            })?;

        let rows = pressure_events
            .filter(recorded_at.ge(start.to_diesel()))
            .order(recorded_at.asc())
            .select(PressureEventRow::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)?;

        rows.into_iter().map(to_stored).collect()
    }

    /// Deletes events with `start <= recorded_at < end` and returns them.
    pub async fn delete_in_range(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> AppResult<Vec<StoredEvent>> {
        use crate::schema::pressure_events::dsl::*;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AppError::ConnectionPool {
                source: anyhow::Error::from(e),
            })?;

        let rows = diesel::delete(
            pressure_events
                .filter(recorded_at.ge(start.to_diesel()))
                .filter(recorded_at.lt(end.to_diesel())),
        )
        .returning(PressureEventRow::as_returning())
        .get_results(&mut conn)
        .await
        .map_err(AppError::from)?;

        let mut events = rows
            .into_iter()
            .map(to_stored)
            .collect::<AppResult<Vec<_>>>()?;
        events.sort_by_key(|e| e.record.recorded_at);
        Ok(events)
    }

    pub async fn count(&self) -> AppResult<i64> {
        use crate::schema::pressure_events::dsl::*;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AppError::ConnectionPool {
                source: anyhow::Error::from(e),
            })?;

        pressure_events
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(AppError::from)
    }
}

fn to_stored(row: PressureEventRow) -> AppResult<StoredEvent> {
    let row_id = row.id;
    StoredEvent::try_from(row).map_err(|e| AppError::Database {
        operation: format!("decode deliveries of event {row_id}"),
        source: anyhow::Error::from(e),
    })
}
