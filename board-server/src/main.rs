use std::net::SocketAddr;
use std::time::Duration;

use chrono::Local;
use tracing_subscriber::EnvFilter;

use board_server::cache::{BoardCacheConfig, FeedStore};
use board_server::engine::BoardConfig;
use board_server::feed::{FeedClient, FeedConfig, load_fixture};
use board_server::web::{AppState, create_router};

/// How often the feed snapshots are refreshed.
const FEED_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let feeds = FeedStore::default();

    // A fixture file seeds the snapshots so the server is usable before
    // (or without) the first upstream fetch.
    if let Ok(path) = std::env::var("FIXTURE_FILE") {
        match load_fixture(&path) {
            Ok(bundle) => {
                tracing::info!(
                    path = %path,
                    schedules = bundle.schedules.len(),
                    perturbations = bundle.perturbations.len(),
                    "loaded feed fixture"
                );
                feeds.store_bundle(bundle).await;
            }
            Err(e) => tracing::error!(path = %path, error = %e, "failed to load feed fixture"),
        }
    }

    match std::env::var("FEED_BASE_URL") {
        Ok(base_url) => {
            let mut config = FeedConfig::new(base_url);
            if let Ok(key) = std::env::var("FEED_API_KEY") {
                config = config.with_api_key(key);
            }
            let client = FeedClient::new(config).expect("failed to create feed client");
            spawn_refresh_task(client, feeds.clone());
        }
        Err(_) => {
            tracing::warn!("FEED_BASE_URL not set, serving fixture data only");
        }
    }

    let state = AppState::new(feeds, BoardConfig::default(), &BoardCacheConfig::default());
    let app = create_router(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000u16);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!(%addr, "board server listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app).await.expect("server error");
}

/// Poll every feed on a fixed cadence, overwriting the snapshots with
/// whatever completes; failures keep the last-known value.
fn spawn_refresh_task(client: FeedClient, feeds: FeedStore) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(FEED_REFRESH_INTERVAL);
        loop {
            interval.tick().await;
            let today = Local::now().date_naive();

            feeds
                .schedules
                .apply(client.fetch_schedules().await, "schedules")
                .await;
            feeds
                .perturbations
                .apply(client.fetch_daily_perturbations(today).await, "perturbations")
                .await;

            match client.fetch_platforms(None).await {
                Ok((overrides, assignments)) => {
                    feeds.platform_overrides.store(overrides).await;
                    feeds.platform_assignments.store(assignments).await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "platform feed refresh failed, keeping last-known value");
                }
            }
        }
    });
}
