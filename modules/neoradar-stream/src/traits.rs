// Trait seam between the streaming pipeline and the NeoWs service.
//
// NeoSource is implemented by the real HTTP client and by MockNeoSource in
// `testing`, so sessions and lookups run without network access.

use async_trait::async_trait;
use chrono::NaiveDate;

use neows_client::{FeedResponse, NeoWsClient, RawFeedRecord};

#[async_trait]
pub trait NeoSource: Send + Sync {
    /// Approach feed starting at `date`.
    async fn feed(&self, date: NaiveDate) -> neows_client::Result<FeedResponse>;

    /// A single object by id.
    async fn neo(&self, neo_id: &str) -> neows_client::Result<RawFeedRecord>;
}

#[async_trait]
impl NeoSource for NeoWsClient {
    async fn feed(&self, date: NaiveDate) -> neows_client::Result<FeedResponse> {
        NeoWsClient::feed(self, date).await
    }

    async fn neo(&self, neo_id: &str) -> neows_client::Result<RawFeedRecord> {
        NeoWsClient::neo(self, neo_id).await
    }
}
