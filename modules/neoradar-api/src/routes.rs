use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::warn;

use crate::rest;
use crate::AppState;

pub fn build_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // Risk stream + lookup
        .route("/asteroids", get(rest::stream_asteroids))
        .route("/asteroids/watched", get(rest::watchlist::watched_asteroids))
        .route("/asteroids/watch", post(rest::watchlist::watch_asteroid))
        .route(
            "/asteroids/watch/{neo_id}",
            delete(rest::watchlist::unwatch_asteroid),
        )
        .route("/asteroids/{neo_id}", get(rest::asteroid_detail))
        // Chat
        .route("/chat/send", post(rest::chat::send_message))
        .route("/chat/messages", get(rest::chat::recent_messages))
        .with_state(state)
        .layer(cors_layer(allowed_origins))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Method + path only: query strings may carry credentials
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
