pub mod chat;
pub mod watchlist;

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{
        sse::{Event, Sse},
        IntoResponse, Json,
    },
};
use tracing::warn;

use neoradar_common::StreamEvent;
use neoradar_stream::{channel, LookupError, StreamSession};

use crate::AppState;

/// Events buffered per subscriber before the session waits on the client.
const STREAM_BUFFER: usize = 16;

// --- Helpers ---

fn to_sse(event: &StreamEvent) -> Option<Event> {
    match event.data() {
        Ok(data) => Some(Event::default().event(event.kind().as_str()).data(data)),
        Err(e) => {
            warn!(error = %e, kind = %event.kind(), "Dropping unserializable event");
            None
        }
    }
}

/// Upstream rejections keep their status; anything else is a 500 carrying
/// the cause.
fn lookup_failure(err: &LookupError) -> (StatusCode, Json<serde_json::Value>) {
    match err.status() {
        Some(status) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            Json(serde_json::json!({"detail": "NASA API error"})),
        ),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"detail": err.to_string()})),
        ),
    }
}

// --- Handlers ---

/// Live risk stream. Each connection gets its own session task; the task
/// ends once this response body is dropped.
pub async fn stream_asteroids(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (sink, mut rx) = channel(STREAM_BUFFER);
    let session = StreamSession::new(state.fetcher.clone(), sink, state.stream_settings)
        .with_clock(state.today);
    tokio::spawn(session.run());

    let events = async_stream::stream! {
        while let Some(event) = rx.recv().await {
            if let Some(sse) = to_sse(&event) {
                yield Ok::<_, Infallible>(sse);
            }
        }
    };

    (
        [(
            HeaderName::from_static("x-accel-buffering"),
            HeaderValue::from_static("no"),
        )],
        Sse::new(events),
    )
}

pub async fn asteroid_detail(
    State(state): State<Arc<AppState>>,
    Path(neo_id): Path<String>,
) -> impl IntoResponse {
    match state.lookup.lookup(&neo_id, (state.today)()).await {
        Ok(detail) => Json(detail).into_response(),
        Err(e) => lookup_failure(&e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_is_forwarded() {
        let (status, Json(body)) = lookup_failure(&LookupError::Upstream { status: 429 });
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["detail"], "NASA API error");
    }

    #[test]
    fn other_failures_are_500_with_cause() {
        let (status, Json(body)) =
            lookup_failure(&LookupError::Failed("Request timed out".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "Request timed out");
    }
}
