use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use neoradar_common::ChatMessage;

use crate::auth::CurrentUser;
use crate::AppState;

/// How many messages the history endpoint returns.
pub const HISTORY_LIMIT: usize = 50;

#[derive(Deserialize)]
pub struct SendMessage {
    text: String,
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<SendMessage>,
) -> impl IntoResponse {
    let message = ChatMessage {
        id: Uuid::new_v4(),
        email: user.email,
        text: body.text,
        timestamp: chrono::Utc::now(),
    };

    match state.chat.append(message).await {
        Ok(()) => Json(serde_json::json!({"message": "Message sent"})).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to store chat message");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn recent_messages(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.chat.recent(HISTORY_LIMIT).await {
        Ok(messages) => Json(serde_json::json!({ "messages": messages })).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to load chat messages");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
