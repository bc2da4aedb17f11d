use std::sync::Arc;

use anyhow::Result;
use tokio::{net::TcpListener, sync::Notify};
use tracing_subscriber::EnvFilter;

use libs::util;

use gallery::{AppState, Config, api, common::metrics, db::Repository};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;

    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let repo = Repository::open(&config.gallery_db_file)?;
    tracing::info!("using database {}", config.gallery_db_file.display());
    tracing::info!("serving media from {}", config.gallery_media_root.display());

    let api_addr = config.api_addr()?;
    let metrics_addr = config.metrics_addr()?;
    let refresh_secs = config.prometheus_refresh_interval;

    let state = AppState::new(config, repo)?;
    let api_router = api::router(state.clone());
    let metrics_router = metrics::prometheus_router()?;

    metrics::spawn_gallery_metrics(state.repo.clone(), refresh_secs);

    let shutdown_notify = Arc::new(Notify::new());
    tokio::spawn(util::listen_for_shutdown(shutdown_notify.clone()));

    let api_listener = TcpListener::bind(api_addr).await?;
    let metrics_listener = TcpListener::bind(metrics_addr).await?;

    tracing::info!("⇢ API listening on: http://{}", api_listener.local_addr()?);
    tracing::info!(
        "⇢ Metrics listening on: http://{}/metrics",
        metrics_listener.local_addr()?
    );

    let api_server = axum::serve(api_listener, api_router).with_graceful_shutdown({
        let n = shutdown_notify.clone();
        async move { n.notified().await }
    });
    let metrics_server = axum::serve(metrics_listener, metrics_router).with_graceful_shutdown({
        let n = shutdown_notify.clone();
        async move { n.notified().await }
    });

    tokio::try_join!(api_server, metrics_server)?;

    Ok(())
}
