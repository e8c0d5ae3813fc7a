//! Upstream HTTP clients

pub mod feed;
pub mod generation;

pub use feed::{FeedClient, FeedError};
pub use generation::GenerationClient;

use std::time::Duration;

/// Shared reqwest client builder; no timeout unless configured
pub(crate) fn build_http_client(timeout_secs: Option<u64>) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));

    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build()
}
