use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use neoradar_common::StreamEvent;

/// The subscriber went away; the event was not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("subscriber disconnected")]
pub struct SinkClosed;

/// Where a session pushes its events.
///
/// Disconnection is polled through `is_closed`; `closed` resolves once the
/// subscriber is gone and lets an in-flight fetch be abandoned.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn push(&self, event: StreamEvent) -> Result<(), SinkClosed>;

    fn is_closed(&self) -> bool;

    async fn closed(&self);
}

/// Sink backed by a bounded channel. The subscriber holds the receiver;
/// dropping it is the disconnect signal.
pub struct ChannelSink {
    tx: mpsc::Sender<StreamEvent>,
}

pub fn channel(buffer: usize) -> (ChannelSink, mpsc::Receiver<StreamEvent>) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (ChannelSink { tx }, rx)
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn push(&self, event: StreamEvent) -> Result<(), SinkClosed> {
        self.tx.send(event).await.map_err(|_| SinkClosed)
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn closed(&self) {
        self.tx.closed().await
    }
}
