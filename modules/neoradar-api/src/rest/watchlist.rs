use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{info, warn};

use neoradar_common::WatchlistEntry;

use crate::auth::CurrentUser;
use crate::AppState;

fn store_failure(e: anyhow::Error) -> axum::response::Response {
    warn!(error = %e, "Watchlist store failed");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

pub async fn watch_asteroid(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(entry): Json<WatchlistEntry>,
) -> impl IntoResponse {
    let neo_id = entry.neo_id.clone();
    match state.watchlists.add(&user.email, entry).await {
        Ok(true) => {
            info!(neo_id, "Added to watchlist");
            Json(serde_json::json!({"message": "Asteroid added to watchlist"})).into_response()
        }
        Ok(false) => {
            Json(serde_json::json!({"message": "Asteroid already in watchlist"})).into_response()
        }
        Err(e) => store_failure(e),
    }
}

pub async fn watched_asteroids(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    match state.watchlists.list(&user.email).await {
        Ok(watchlist) => Json(serde_json::json!({ "watchlist": watchlist })).into_response(),
        Err(e) => store_failure(e),
    }
}

pub async fn unwatch_asteroid(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(neo_id): Path<String>,
) -> impl IntoResponse {
    match state.watchlists.remove(&user.email, &neo_id).await {
        Ok(_) => {
            Json(serde_json::json!({"message": "Asteroid removed from watchlist"})).into_response()
        }
        Err(e) => store_failure(e),
    }
}
