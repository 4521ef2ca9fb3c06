//! HTTP Server and Refresh Startup
//!
//! This module wires the exporter together and serves the snapshot over a Unix
//! domain socket.
//!
//! # Architecture
//!
//! - **HTTP Server**: Axum router bound to a Unix socket, so only co-located
//!   collectors can scrape it
//! - **Refresh Loop**: Background task that rebuilds the snapshot on a fixed cadence
//! - **State Management**: The [`SnapshotStore`] is shared with handlers through axum state
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page linking to the metrics path
//! - `GET <metrics_path>` - Latest snapshot in Prometheus text format
//!
//! # Startup
//!
//! The listener is bound first so an unusable socket path fails fast. One refresh
//! cycle then runs to completion before requests are served, which means the first
//! scrape is never empty unless every upstream failed.

use crate::config::Config;
use crate::passthrough::PassthroughClient;
use crate::refresh::{run_schedule, Refresher};
use crate::snapshot::SnapshotStore;
use crate::solr::SolrClient;
use anyhow::Context;
use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tokio::net::UnixListener;
use tracing::{info, warn};

/// Content type of the Prometheus text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Clone)]
pub struct AppState {
    pub store: SnapshotStore,
    pub metrics_path: Arc<str>,
}

pub async fn start(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    let store = SnapshotStore::new();
    let solr = SolrClient::new(&config.solr).context("Failed to build Solr HTTP client")?;
    let passthrough = PassthroughClient::new(&config.passthrough);
    let refresher = Arc::new(Refresher::new(solr, passthrough, store.clone()));

    let listener = bind_unix_socket(&config.server.listen_socket)?;
    info!("Metrics server listening on {}", config.server.listen_socket);

    refresher.try_refresh().await;

    let schedule = refresher.clone();
    let period = config.refresh.interval();
    tokio::spawn(async move {
        run_schedule(schedule, period).await;
    });

    let app = router(AppState {
        store,
        metrics_path: Arc::from(config.server.metrics_path.as_str()),
    });

    info!(
        "Metrics available at unix:{}{}",
        config.server.listen_socket, config.server.metrics_path
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    remove_socket_file(Path::new(&config.server.listen_socket));
    served.context("HTTP server error")?;

    Ok(())
}

/// Build the exporter router: the landing page and the metrics route.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route(&state.metrics_path, get(metrics_handler))
        .with_state(state)
}

/// Bind a Unix listener, replacing a stale socket file left by a previous run.
pub fn bind_unix_socket(path: &str) -> anyhow::Result<UnixListener> {
    let socket = Path::new(path);
    if socket.exists() {
        std::fs::remove_file(socket)
            .with_context(|| format!("Failed to remove stale socket {}", path))?;
    }
    UnixListener::bind(socket).with_context(|| format!("Failed to bind Unix socket {}", path))
}

fn remove_socket_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        warn!("Failed to remove socket {}: {}", path.display(), e);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server");
}

async fn root_handler(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        r#"<html>
<head><title>Solr Exporter</title></head>
<body>
<h1>Solr Exporter</h1>
<p><a href="{}">Metrics</a></p>
</body>
</html>"#,
        state.metrics_path
    ))
}

async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        state.store.read().to_string(),
    )
}
