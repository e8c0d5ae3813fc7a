//! Ingestion adapter - feed page to stored threat records

use crate::clients::{FeedClient, FeedError};
use crate::db::{StoreError, ThreatStore};
use crate::models::{PulsePage, Threat};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fetch one feed page and store every mappable pulse in a single batch.
///
/// Not idempotent: ingesting the same page twice stores duplicates.
pub async fn ingest_page(
    feed: &FeedClient,
    store: &dyn ThreatStore,
    page: u32,
) -> Result<Vec<Threat>, IngestError> {
    let pulses = feed.fetch_subscribed(page).await?;
    let threats = to_threats(pulses);

    let inserted = store.insert_many(&threats).await?;
    tracing::info!("Ingested {} threats from feed page {}", inserted.len(), page);

    Ok(inserted)
}

/// Pulses with an unusable `modified` timestamp are skipped
fn to_threats(page: PulsePage) -> Vec<Threat> {
    tracing::debug!("Feed page holds {} pulses", page.results.len());

    page.results
        .into_iter()
        .filter_map(|pulse| {
            let id = pulse.id.clone().unwrap_or_default();
            match pulse.into_threat() {
                Ok(threat) => Some(threat),
                Err(e) => {
                    tracing::warn!("Skipping pulse {}: {}", id, e);
                    None
                }
            }
        })
        .collect()
}
