//! Repository layer for data access operations.

mod event_repo;

pub use event_repo::EventRepository;

use crate::db::AsyncDbPool;

/// Aggregates all repositories. Cloning is cheap since the pool is `Arc`-backed.
#[derive(Clone)]
pub struct Repositories {
    pub events: EventRepository,
}

impl Repositories {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            events: EventRepository::new(pool),
        }
    }
}
