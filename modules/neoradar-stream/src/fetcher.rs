use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

use neows_client::{FeedResponse, NeoWsError};

use crate::traits::NeoSource;

/// Why a tick produced no batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeedFailure {
    #[error("upstream rejected the request with status {status}")]
    Rejected { status: u16 },

    #[error("upstream did not answer in time")]
    Timeout,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed feed body: {0}")]
    Malformed(String),
}

impl From<NeoWsError> for FeedFailure {
    fn from(err: NeoWsError) -> Self {
        match err {
            NeoWsError::Api { status, .. } => FeedFailure::Rejected { status },
            NeoWsError::Timeout => FeedFailure::Timeout,
            NeoWsError::Parse(msg) => FeedFailure::Malformed(msg),
            NeoWsError::Network(msg) | NeoWsError::Url(msg) => FeedFailure::Transport(msg),
        }
    }
}

/// One bounded fetch of the feed per call. All upstream instability ends
/// here as a `FeedFailure`.
#[derive(Clone)]
pub struct FeedFetcher {
    source: Arc<dyn NeoSource>,
    timeout: Duration,
}

impl FeedFetcher {
    pub fn new(source: Arc<dyn NeoSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    pub async fn fetch(&self, date: NaiveDate) -> Result<FeedResponse, FeedFailure> {
        info!(%date, "Fetching NEO feed");

        let result = match tokio::time::timeout(self.timeout, self.source.feed(date)).await {
            Ok(result) => result.map_err(FeedFailure::from),
            Err(_) => Err(FeedFailure::Timeout),
        };

        match &result {
            Ok(feed) => {
                info!(count = feed.near_earth_objects.record_count(), "Feed received");
            }
            Err(FeedFailure::Rejected { status }) => {
                warn!(status, "NEO feed rejected the request");
            }
            Err(e) => {
                warn!(error = %e, "NEO feed fetch failed");
            }
        }

        result
    }
}
