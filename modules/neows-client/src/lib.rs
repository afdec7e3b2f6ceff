pub mod error;
pub mod types;

pub use error::{NeoWsError, Result};
pub use types::{
    CloseApproach, DateGroups, DiameterRange, EstimatedDiameter, FeedResponse, Measure,
    MissDistance, RawFeedRecord, RelativeVelocity,
};

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

pub const DEFAULT_BASE_URL: &str = "https://api.nasa.gov/neo/rest/v1";

const DEFAULT_FEED_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

pub struct NeoWsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    feed_timeout: Duration,
    lookup_timeout: Duration,
}

impl NeoWsClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            feed_timeout: DEFAULT_FEED_TIMEOUT,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, feed: Duration, lookup: Duration) -> Self {
        self.feed_timeout = feed;
        self.lookup_timeout = lookup;
        self
    }

    /// Fetch the approach feed starting at `start_date`.
    pub async fn feed(&self, start_date: NaiveDate) -> Result<FeedResponse> {
        let mut url = self.endpoint(&["feed"])?;
        url.query_pairs_mut()
            .append_pair("start_date", &start_date.format("%Y-%m-%d").to_string())
            .append_pair("api_key", &self.api_key);

        tracing::debug!(%start_date, "Requesting NeoWs feed");
        self.get_json(url, self.feed_timeout).await
    }

    /// Fetch a single object, including its orbital data.
    pub async fn neo(&self, neo_id: &str) -> Result<RawFeedRecord> {
        let mut url = self.endpoint(&["neo", neo_id])?;
        url.query_pairs_mut().append_pair("api_key", &self.api_key);

        tracing::debug!(neo_id, "Requesting NeoWs object");
        self.get_json(url, self.lookup_timeout).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| NeoWsError::Url(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| NeoWsError::Url(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, timeout: Duration) -> Result<T> {
        let resp = self.client.get(url).timeout(timeout).send().await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let message = resp.text().await.unwrap_or_default();
            return Err(NeoWsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_segments() {
        let client = NeoWsClient::new("https://api.nasa.gov/neo/rest/v1/", "KEY");
        let url = client.endpoint(&["feed"]).unwrap();
        assert_eq!(url.as_str(), "https://api.nasa.gov/neo/rest/v1/feed");
    }

    #[test]
    fn endpoint_escapes_object_id() {
        let client = NeoWsClient::new(DEFAULT_BASE_URL, "KEY");
        let url = client.endpoint(&["neo", "../feed?x=1"]).unwrap();
        assert!(url.path().starts_with("/neo/rest/v1/neo/"));
        assert!(url.query().is_none());
    }

    #[test]
    fn rejects_unparseable_base() {
        let client = NeoWsClient::new("not a url", "KEY");
        assert!(matches!(client.endpoint(&["feed"]), Err(NeoWsError::Url(_))));
    }

    #[tokio::test]
    async fn unreachable_host_is_classified() {
        let client = NeoWsClient::new("http://127.0.0.1:9", "KEY")
            .with_timeouts(Duration::from_millis(500), Duration::from_millis(500));
        let err = client.neo("1").await.unwrap_err();
        assert!(matches!(err, NeoWsError::Network(_) | NeoWsError::Timeout));
        assert_eq!(err.status(), None);
    }
}
