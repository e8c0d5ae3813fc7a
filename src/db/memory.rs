//! In-memory store used by tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{StoreResult, ThreatStore};
use crate::models::Threat;
use crate::services::matcher::SearchTerm;

#[derive(Default)]
pub struct MemoryThreatStore {
    threats: Mutex<Vec<Threat>>,
    writes: AtomicUsize,
    reads: AtomicUsize,
}

impl MemoryThreatStore {
    pub fn with_threats(threats: Vec<Threat>) -> Self {
        Self {
            threats: Mutex::new(threats),
            ..Self::default()
        }
    }

    /// Number of `insert_many` calls
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of `find_by_tags` calls
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.threats.lock().unwrap().len()
    }
}

#[async_trait]
impl ThreatStore for MemoryThreatStore {
    async fn insert_many(&self, threats: &[Threat]) -> StoreResult<Vec<Threat>> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.threats.lock().unwrap().extend_from_slice(threats);
        Ok(threats.to_vec())
    }

    async fn find_by_tags(&self, terms: &[SearchTerm], limit: i64) -> StoreResult<Vec<Threat>> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let mut found: Vec<Threat> = self
            .threats
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.tags.iter().any(|tag| terms.iter().any(|term| term.matches(tag))))
            .cloned()
            .collect();

        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found.truncate(limit.max(0) as usize);
        Ok(found)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn close(&self) {}
}

/// Store whose every query fails, for error-path tests
#[derive(Default)]
pub struct UnreachableThreatStore;

#[async_trait]
impl ThreatStore for UnreachableThreatStore {
    async fn insert_many(&self, _threats: &[Threat]) -> StoreResult<Vec<Threat>> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn find_by_tags(&self, _terms: &[SearchTerm], _limit: i64) -> StoreResult<Vec<Threat>> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn ping(&self) -> StoreResult<()> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn close(&self) {}
}
