//! Per-subscriber streaming loop.
//!
//! ```text
//! Starting --info--> Active --fetch, update|error--> Draining --cadence elapsed--> Active
//!                      |                                 |
//!                      +---------- disconnected ---------+--> Closed
//! ```
//!
//! Disconnection is checked before every fetch, raced against the fetch
//! itself, and polled before every drain increment, so a gone subscriber is
//! noticed within one poll interval.

use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use neoradar_common::{StreamEvent, StreamSettings};

use crate::fetcher::FeedFetcher;
use crate::normalize::normalize;
use crate::sink::EventSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Starting,
    Active,
    Draining,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub connected: bool,
    pub last_tick: Option<DateTime<Utc>>,
    pub ticks: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Starting,
            connected: true,
            last_tick: None,
            ticks: 0,
        }
    }
}

pub struct StreamSession<K: EventSink> {
    id: Uuid,
    fetcher: FeedFetcher,
    sink: K,
    settings: StreamSettings,
    today: fn() -> NaiveDate,
    state: SessionState,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl<K: EventSink> StreamSession<K> {
    pub fn new(fetcher: FeedFetcher, sink: K, settings: StreamSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            fetcher,
            sink,
            settings,
            today: local_today,
            state: SessionState::default(),
        }
    }

    /// Override the date each tick fetches for.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Drive the session until the subscriber disconnects. Returns the
    /// final state.
    pub async fn run(mut self) -> SessionState {
        let span = info_span!("stream_session", session_id = %self.id);
        async move {
            info!("Stream session opened");
            while self.state.phase != SessionPhase::Closed {
                self.state.phase = self.step().await;
            }
            info!(ticks = self.state.ticks, "Stream session closed");
            self.state
        }
        .instrument(span)
        .await
    }

    /// Perform the work of the current phase and return the next one.
    pub async fn step(&mut self) -> SessionPhase {
        match self.state.phase {
            SessionPhase::Starting => {
                self.emit(StreamEvent::liveness()).await;
                SessionPhase::Active
            }
            SessionPhase::Active => self.tick().await,
            SessionPhase::Draining => self.drain().await,
            SessionPhase::Closed => SessionPhase::Closed,
        }
    }

    async fn tick(&mut self) -> SessionPhase {
        if self.client_gone() {
            return SessionPhase::Closed;
        }

        let today = (self.today)();
        self.state.last_tick = Some(Utc::now());
        self.state.ticks += 1;

        let outcome = tokio::select! {
            outcome = self.fetcher.fetch(today) => Some(outcome),
            _ = self.sink.closed() => None,
        };

        let event = match outcome {
            None => {
                self.mark_disconnected();
                return SessionPhase::Closed;
            }
            Some(Ok(feed)) => StreamEvent::Update(normalize(&feed.near_earth_objects, today)),
            Some(Err(failure)) => {
                warn!(error = %failure, "Tick failed, sending recalibration marker");
                StreamEvent::recalibrating()
            }
        };

        self.emit(event).await;
        SessionPhase::Draining
    }

    async fn drain(&mut self) -> SessionPhase {
        let poll = self.settings.poll.max(std::time::Duration::from_millis(1));
        let increments = self.settings.cadence.as_nanos().div_ceil(poll.as_nanos());

        for _ in 0..increments {
            if self.client_gone() {
                return SessionPhase::Closed;
            }
            tokio::time::sleep(poll).await;
        }
        SessionPhase::Active
    }

    /// Push unless already disconnected; a failed push marks the session
    /// disconnected.
    async fn emit(&mut self, event: StreamEvent) {
        if !self.state.connected {
            return;
        }
        let kind = event.kind();
        if self.sink.push(event).await.is_err() {
            self.mark_disconnected();
        } else {
            tracing::debug!(%kind, "Event pushed");
        }
    }

    fn client_gone(&mut self) -> bool {
        if self.state.connected && self.sink.is_closed() {
            self.mark_disconnected();
        }
        !self.state.connected
    }

    fn mark_disconnected(&mut self) {
        if self.state.connected {
            info!("Subscriber disconnected");
            self.state.connected = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::testing::{sample_feed, MockNeoSource, RecordingSink, Scripted};

    fn session(source: MockNeoSource, sink: RecordingSink) -> StreamSession<RecordingSink> {
        let fetcher = FeedFetcher::new(Arc::new(source), Duration::from_secs(15));
        StreamSession::new(fetcher, sink, StreamSettings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn starting_emits_liveness_then_activates() {
        let (sink, handle) = RecordingSink::new();
        let mut s = session(MockNeoSource::new(), sink);
        assert_eq!(s.step().await, SessionPhase::Active);
        assert_eq!(handle.events(), vec![StreamEvent::liveness()]);
    }

    #[tokio::test(start_paused = true)]
    async fn active_closes_immediately_when_disconnected() {
        let (sink, handle) = RecordingSink::new();
        let source = MockNeoSource::new().on_feed(Scripted::Feed(sample_feed(1)));
        let calls = source.feed_calls();
        let mut s = session(source, sink);
        s.state.phase = SessionPhase::Active;
        handle.disconnect();
        assert_eq!(s.step().await, SessionPhase::Closed);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(!s.state().connected);
    }

    #[tokio::test(start_paused = true)]
    async fn push_after_close_is_noop() {
        let (sink, handle) = RecordingSink::new();
        let mut s = session(MockNeoSource::new(), sink);
        handle.disconnect();
        s.emit(StreamEvent::liveness()).await;
        s.emit(StreamEvent::recalibrating()).await;
        assert!(handle.events().is_empty());
        assert!(!s.state().connected);
    }
}
