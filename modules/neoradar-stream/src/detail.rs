use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::warn;

use neoradar_common::AsteroidDetail;
use neows_client::NeoWsError;

use crate::normalize::score_record;
use crate::traits::NeoSource;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    /// The service answered with a non-success status.
    #[error("NASA API error (status {status})")]
    Upstream { status: u16 },

    #[error("{0}")]
    Failed(String),
}

impl LookupError {
    pub fn status(&self) -> Option<u16> {
        match self {
            LookupError::Upstream { status } => Some(*status),
            LookupError::Failed(_) => None,
        }
    }
}

impl From<NeoWsError> for LookupError {
    fn from(err: NeoWsError) -> Self {
        match err.status() {
            Some(status) => LookupError::Upstream { status },
            None => LookupError::Failed(err.to_string()),
        }
    }
}

/// One-shot fetch and score of a single object.
#[derive(Clone)]
pub struct DetailLookup {
    source: Arc<dyn NeoSource>,
    timeout: Duration,
}

impl DetailLookup {
    pub fn new(source: Arc<dyn NeoSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    pub async fn lookup(
        &self,
        neo_id: &str,
        observed: NaiveDate,
    ) -> Result<AsteroidDetail, LookupError> {
        let record = match tokio::time::timeout(self.timeout, self.source.neo(neo_id)).await {
            Ok(result) => result.map_err(LookupError::from),
            Err(_) => Err(LookupError::Failed(NeoWsError::Timeout.to_string())),
        }
        .inspect_err(|e| warn!(neo_id, error = %e, "Detail lookup failed"))?;

        let orbital_data = record
            .orbital_data
            .clone()
            .unwrap_or_else(|| serde_json::Value::Object(Default::default()));

        Ok(AsteroidDetail {
            asteroid: score_record(&record, observed),
            orbital_data,
        })
    }
}
