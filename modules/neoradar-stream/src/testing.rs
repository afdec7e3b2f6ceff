// Test doubles for the streaming pipeline.
//
// - MockNeoSource (NeoSource): scripted feed responses, id -> object map
// - RecordingSink (EventSink): records pushes with their (virtual) time,
//   disconnected on demand through its RecordingHandle

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::watch;
use tokio::time::Instant;

use neoradar_common::{EventKind, StreamEvent};
use neows_client::{
    CloseApproach, DateGroups, DiameterRange, EstimatedDiameter, FeedResponse, Measure,
    MissDistance, NeoWsError, RawFeedRecord, RelativeVelocity,
};

use crate::sink::{EventSink, SinkClosed};
use crate::traits::NeoSource;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A fully populated record: 0.1 km across, 36 000 km/h, 5 000 000 km out.
pub fn sample_record(id: &str, hazardous: bool) -> RawFeedRecord {
    RawFeedRecord {
        id: id.to_string(),
        name: format!("({id})"),
        estimated_diameter: Some(EstimatedDiameter {
            kilometers: Some(DiameterRange {
                estimated_diameter_min: Some(0.05),
                estimated_diameter_max: Some(0.1),
            }),
            meters: Some(DiameterRange {
                estimated_diameter_min: Some(50.0),
                estimated_diameter_max: Some(100.0),
            }),
        }),
        close_approach_data: Some(vec![CloseApproach {
            close_approach_date: Some("2024-01-01".to_string()),
            relative_velocity: Some(RelativeVelocity {
                kilometers_per_hour: Some(Measure(36_000.0)),
            }),
            miss_distance: Some(MissDistance {
                kilometers: Some(Measure(5_000_000.0)),
            }),
            orbiting_body: Some("Earth".to_string()),
        }]),
        is_potentially_hazardous_asteroid: Some(hazardous),
        orbital_data: None,
    }
}

/// A feed with `count` records under a single date.
pub fn sample_feed(count: usize) -> FeedResponse {
    let records = (0..count)
        .map(|i| sample_record(&format!("{}", 1000 + i), i % 2 == 0))
        .collect();
    FeedResponse {
        element_count: Some(count as u64),
        near_earth_objects: DateGroups(vec![("2024-01-01".to_string(), records)]),
    }
}

pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")
}

// ---------------------------------------------------------------------------
// MockNeoSource
// ---------------------------------------------------------------------------

/// One scripted upstream answer.
#[derive(Debug, Clone)]
pub enum Scripted {
    Feed(FeedResponse),
    Status(u16),
    Malformed,
    /// Never answers.
    Hang,
}

/// Feed calls walk the script in order and repeat the last entry once it
/// runs out. An empty script answers with an empty feed.
pub struct MockNeoSource {
    feed_script: Vec<Scripted>,
    feed_calls: Arc<AtomicUsize>,
    objects: HashMap<String, RawFeedRecord>,
    object_statuses: HashMap<String, u16>,
    requested_dates: Mutex<Vec<NaiveDate>>,
}

impl MockNeoSource {
    pub fn new() -> Self {
        Self {
            feed_script: Vec::new(),
            feed_calls: Arc::new(AtomicUsize::new(0)),
            objects: HashMap::new(),
            object_statuses: HashMap::new(),
            requested_dates: Mutex::new(Vec::new()),
        }
    }

    pub fn on_feed(mut self, answer: Scripted) -> Self {
        self.feed_script.push(answer);
        self
    }

    pub fn on_neo(mut self, record: RawFeedRecord) -> Self {
        self.objects.insert(record.id.clone(), record);
        self
    }

    pub fn on_neo_status(mut self, neo_id: &str, status: u16) -> Self {
        self.object_statuses.insert(neo_id.to_string(), status);
        self
    }

    /// Shared counter of feed calls, readable after the mock moves into a
    /// session.
    pub fn feed_calls(&self) -> Arc<AtomicUsize> {
        self.feed_calls.clone()
    }

    pub fn requested_dates(&self) -> Vec<NaiveDate> {
        self.requested_dates.lock().unwrap().clone()
    }
}

impl Default for MockNeoSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NeoSource for MockNeoSource {
    async fn feed(&self, date: NaiveDate) -> neows_client::Result<FeedResponse> {
        let call = self.feed_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_dates.lock().unwrap().push(date);

        let answer = match self.feed_script.len() {
            0 => return Ok(FeedResponse::default()),
            len => self.feed_script[call.min(len - 1)].clone(),
        };

        match answer {
            Scripted::Feed(feed) => Ok(feed),
            Scripted::Status(status) => Err(NeoWsError::Api {
                status,
                message: "scripted failure".to_string(),
            }),
            Scripted::Malformed => Err(NeoWsError::Parse("expected value".to_string())),
            Scripted::Hang => std::future::pending().await,
        }
    }

    async fn neo(&self, neo_id: &str) -> neows_client::Result<RawFeedRecord> {
        if let Some(status) = self.object_statuses.get(neo_id) {
            return Err(NeoWsError::Api {
                status: *status,
                message: "scripted failure".to_string(),
            });
        }
        self.objects.get(neo_id).cloned().ok_or(NeoWsError::Api {
            status: 404,
            message: format!("no object {neo_id}"),
        })
    }
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Recorded {
    pub at: Instant,
    pub event: StreamEvent,
}

/// Sink half, handed to the session.
pub struct RecordingSink {
    events: Arc<Mutex<Vec<Recorded>>>,
    closed: watch::Receiver<bool>,
}

/// Test half: inspect what was pushed, disconnect the subscriber. Dropping
/// the handle also counts as a disconnect.
pub struct RecordingHandle {
    events: Arc<Mutex<Vec<Recorded>>>,
    closed: watch::Sender<bool>,
}

impl RecordingSink {
    pub fn new() -> (Self, RecordingHandle) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = watch::channel(false);
        (
            Self {
                events: events.clone(),
                closed: rx,
            },
            RecordingHandle { events, closed: tx },
        )
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn push(&self, event: StreamEvent) -> Result<(), SinkClosed> {
        if self.is_closed() {
            return Err(SinkClosed);
        }
        self.events.lock().unwrap().push(Recorded {
            at: Instant::now(),
            event,
        });
        Ok(())
    }

    fn is_closed(&self) -> bool {
        *self.closed.borrow() || self.closed.has_changed().is_err()
    }

    async fn closed(&self) {
        let mut rx = self.closed.clone();
        let _ = rx.wait_for(|closed| *closed).await;
    }
}

impl RecordingHandle {
    pub fn disconnect(&self) {
        self.closed.send_replace(true);
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<StreamEvent> {
        self.recorded().into_iter().map(|r| r.event).collect()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.recorded().iter().map(|r| r.event.kind()).collect()
    }
}
