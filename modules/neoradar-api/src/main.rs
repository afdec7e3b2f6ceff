use std::sync::Arc;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use tracing::info;
use tracing_subscriber::EnvFilter;

use neoradar_common::{Config, StreamSettings};
use neoradar_stream::{DetailLookup, FeedFetcher, NeoSource};
use neows_client::NeoWsClient;

mod auth;
mod jwt;
mod rest;
mod routes;
mod store;

use jwt::JwtService;
use store::{ChatStore, MemoryStore, UserDirectory, WatchlistStore};

pub struct AppState {
    pub fetcher: FeedFetcher,
    pub lookup: DetailLookup,
    pub stream_settings: StreamSettings,
    pub jwt: JwtService,
    pub users: Arc<dyn UserDirectory>,
    pub watchlists: Arc<dyn WatchlistStore>,
    pub chat: Arc<dyn ChatStore>,
    /// Observation date stamped on scored records.
    pub today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl AppState {
    pub fn new(config: &Config, source: Arc<dyn NeoSource>, store: Arc<MemoryStore>) -> Self {
        Self {
            fetcher: FeedFetcher::new(source.clone(), config.feed_timeout()),
            lookup: DetailLookup::new(source, config.detail_timeout()),
            stream_settings: config.stream_settings(),
            jwt: JwtService::new(&config.jwt_secret, config.jwt_issuer.clone()),
            users: store.clone(),
            watchlists: store.clone(),
            chat: store,
            today: local_today,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("neoradar=info".parse()?)
                .add_directive("neows_client=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;

    let client = NeoWsClient::new(&config.neows_base_url, &config.nasa_api_key)
        .with_timeouts(config.feed_timeout(), config.detail_timeout());
    let store = Arc::new(MemoryStore::new().provisioning());
    let state = Arc::new(AppState::new(&config, Arc::new(client), store));

    let app = routes::build_router(state, &config.allowed_origins);

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!(
        cadence_secs = config.stream_cadence_secs,
        poll_secs = config.stream_poll_secs,
        "NEO radar API starting on {addr}"
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
