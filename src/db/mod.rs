//! Threat record store
//!
//! The store handle is built once in `main` and shared through `AppState`.

mod postgres;
#[cfg(test)]
mod memory;

pub use postgres::PgThreatStore;
#[cfg(test)]
pub use memory::{MemoryThreatStore, UnreachableThreatStore};

use async_trait::async_trait;

use crate::models::Threat;
use crate::services::matcher::SearchTerm;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ThreatStore: Send + Sync {
    /// Insert all threats in one batch and return what was written
    async fn insert_many(&self, threats: &[Threat]) -> StoreResult<Vec<Threat>>;

    /// Threats with at least one tag containing at least one term,
    /// newest `created_at` first, at most `limit`
    async fn find_by_tags(&self, terms: &[SearchTerm], limit: i64) -> StoreResult<Vec<Threat>>;

    /// Connectivity check for the health endpoint
    async fn ping(&self) -> StoreResult<()>;

    /// Release pooled connections
    async fn close(&self);
}
