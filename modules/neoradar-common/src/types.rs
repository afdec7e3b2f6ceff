use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sent once when a stream opens, before the first fetch.
pub const LIVENESS_TOKEN: &str = "SIGNAL_STABLE";

/// Sent in place of a batch when a tick's fetch fails.
pub const RECALIBRATION_TOKEN: &str = "RECALIBRATING_SENSORS";

// --- Scored output ---

/// One object after normalization and scoring.
///
/// Display metrics are `None` when the upstream record lacked them; the
/// record is still emitted with its (floor) risk score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAsteroid {
    pub neo_id: String,
    pub name: String,
    pub risk_score: f64,
    pub is_hazardous: bool,
    /// Kilometers, rounded.
    pub miss_distance: Option<i64>,
    /// km/h, rounded.
    pub velocity: Option<i64>,
    /// Maximum estimated diameter in meters, two decimals.
    pub diameter: Option<f64>,
    pub last_observed: NaiveDate,
}

/// Single-object lookup result: the scored record plus opaque orbital data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsteroidDetail {
    #[serde(flatten)]
    pub asteroid: ScoredAsteroid,
    pub orbital_data: serde_json::Value,
}

// --- Stream events ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Info,
    Update,
    Error,
}

impl EventKind {
    /// SSE event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Info => "info",
            EventKind::Update => "update",
            EventKind::Error => "error",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Info(String),
    Update(Vec<ScoredAsteroid>),
    Error(String),
}

impl StreamEvent {
    pub fn liveness() -> Self {
        StreamEvent::Info(LIVENESS_TOKEN.to_string())
    }

    pub fn recalibrating() -> Self {
        StreamEvent::Error(RECALIBRATION_TOKEN.to_string())
    }

    pub fn kind(&self) -> EventKind {
        match self {
            StreamEvent::Info(_) => EventKind::Info,
            StreamEvent::Update(_) => EventKind::Update,
            StreamEvent::Error(_) => EventKind::Error,
        }
    }

    /// Wire payload: the raw token for info/error, a JSON array for updates.
    pub fn data(&self) -> Result<String, serde_json::Error> {
        match self {
            StreamEvent::Info(token) | StreamEvent::Error(token) => Ok(token.clone()),
            StreamEvent::Update(batch) => serde_json::to_string(batch),
        }
    }
}

// --- Collaborator records ---

/// A watchlist entry as submitted by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub neo_id: String,
    pub name: String,
    pub risk_score: f64,
    pub is_hazardous: bool,
    pub miss_distance: i64,
    pub velocity: i64,
    pub diameter: f64,
}

/// The identity the core sees for an authenticated caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    #[serde(default)]
    pub watchlist: Vec<WatchlistEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub email: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ScoredAsteroid {
        ScoredAsteroid {
            neo_id: "1".into(),
            name: "X".into(),
            risk_score: 19.5,
            is_hazardous: true,
            miss_distance: Some(5_000_000),
            velocity: Some(36_000),
            diameter: Some(100.0),
            last_observed: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn scored_asteroid_wire_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            json!({
                "neo_id": "1",
                "name": "X",
                "risk_score": 19.5,
                "is_hazardous": true,
                "miss_distance": 5000000,
                "velocity": 36000,
                "diameter": 100.0,
                "last_observed": "2024-01-01"
            })
        );
    }

    #[test]
    fn detail_flattens_asteroid() {
        let detail = AsteroidDetail {
            asteroid: sample(),
            orbital_data: json!({"orbit_id": "7"}),
        };
        let value = serde_json::to_value(detail).unwrap();
        assert_eq!(value["neo_id"], "1");
        assert_eq!(value["orbital_data"]["orbit_id"], "7");
    }

    #[test]
    fn event_names_and_payloads() {
        let info = StreamEvent::liveness();
        assert_eq!(info.kind().as_str(), "info");
        assert_eq!(info.data().unwrap(), "SIGNAL_STABLE");

        let err = StreamEvent::recalibrating();
        assert_eq!(err.kind().as_str(), "error");
        assert_eq!(err.data().unwrap(), "RECALIBRATING_SENSORS");

        let empty = StreamEvent::Update(vec![]);
        assert_eq!(empty.kind(), EventKind::Update);
        assert_eq!(empty.data().unwrap(), "[]");
    }
}
